pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

use sqlx::PgPool;
use std::sync::Arc;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::{
    Entity, IssueOutcome, Page, RentalLedger, RentalRepository, Repository, UserRepository,
};

use memory::MemoryStore;
use models::{Customer, Genre, Movie};
use postgres::PgStore;

/// Handles to every collection, shared by all request handlers.
#[derive(Clone)]
pub struct Store {
    pub genres: Arc<dyn Repository<Genre>>,
    pub customers: Arc<dyn Repository<Customer>>,
    pub movies: Arc<dyn Repository<Movie>>,
    pub rentals: Arc<dyn RentalRepository>,
    pub users: Arc<dyn UserRepository>,
    pub ledger: Arc<dyn RentalLedger>,
    pool: Option<PgPool>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        let pg = Arc::new(PgStore::new(pool.clone()));
        Self {
            genres: pg.clone(),
            customers: pg.clone(),
            movies: pg.clone(),
            rentals: pg.clone(),
            users: pg.clone(),
            ledger: pg,
            pool: Some(pool),
        }
    }

    pub fn memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(mem: Arc<MemoryStore>) -> Self {
        Self {
            genres: mem.genres.clone(),
            customers: mem.customers.clone(),
            movies: mem.movies.clone(),
            rentals: mem.rentals.clone(),
            users: mem.users.clone(),
            ledger: mem,
            pool: None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        match &self.pool {
            Some(pool) => DatabaseManager::health_check(pool).await,
            None => Ok(()),
        }
    }
}
