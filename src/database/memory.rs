//! In-process store backed by hash maps. Used by the test suite and by
//! `serve --memory`; it honours the same ordering and uniqueness rules as
//! the PostgreSQL backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::movie::MAX_STOCK;
use crate::database::models::{Customer, Genre, Movie, Rental, User};
use crate::database::repository::{
    Entity, IssueOutcome, Page, RentalLedger, RentalRepository, Repository, UserRepository,
};

pub struct MemoryCollection<E> {
    docs: RwLock<HashMap<Uuid, E>>,
}

impl<E: Entity> MemoryCollection<E> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
        }
    }

    fn check_unique(docs: &HashMap<Uuid, E>, entity: &E) -> Result<(), DatabaseError> {
        if let Some(key) = entity.unique_key() {
            let taken = docs
                .values()
                .any(|doc| doc.id() != entity.id() && doc.unique_key().as_deref() == Some(key.as_str()));
            if taken {
                return Err(DatabaseError::Conflict(format!("{} '{}' already exists", E::NAME, key)));
            }
        }
        Ok(())
    }
}

impl<E: Entity> Default for MemoryCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryCollection<E> {
    async fn find(&self, id: Uuid) -> Result<Option<E>, DatabaseError> {
        Ok(self.docs.read().await.get(&id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<E>, DatabaseError> {
        let docs = self.docs.read().await;
        let mut all: Vec<&E> = docs.values().collect();
        all.sort_by(|a, b| E::list_order(a, b));
        Ok(all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect())
    }

    async fn insert(&self, entity: &E) -> Result<E, DatabaseError> {
        let mut docs = self.docs.write().await;
        if docs.contains_key(&entity.id()) {
            return Err(DatabaseError::Conflict(format!("{} {} already exists", E::NAME, entity.id())));
        }
        Self::check_unique(&docs, entity)?;
        docs.insert(entity.id(), entity.clone());
        Ok(entity.clone())
    }

    async fn replace(&self, entity: &E) -> Result<Option<E>, DatabaseError> {
        let mut docs = self.docs.write().await;
        if !docs.contains_key(&entity.id()) {
            return Ok(None);
        }
        Self::check_unique(&docs, entity)?;
        docs.insert(entity.id(), entity.clone());
        Ok(Some(entity.clone()))
    }

    async fn remove(&self, id: Uuid) -> Result<Option<E>, DatabaseError> {
        Ok(self.docs.write().await.remove(&id))
    }
}

#[async_trait]
impl UserRepository for MemoryCollection<User> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let wanted = email.to_lowercase();
        Ok(self
            .docs
            .read()
            .await
            .values()
            .find(|user| user.email.to_lowercase() == wanted)
            .cloned())
    }
}

#[async_trait]
impl RentalRepository for MemoryCollection<Rental> {
    async fn lookup(
        &self,
        customer_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Option<Rental>, DatabaseError> {
        Ok(self
            .docs
            .read()
            .await
            .values()
            .filter(|r| r.customer.id == customer_id && r.movie.id == movie_id)
            .max_by(|a, b| {
                (!a.is_returned(), a.date_out, a.id).cmp(&(!b.is_returned(), b.date_out, b.id))
            })
            .cloned())
    }
}

/// All collections of the memory backend.
#[derive(Default)]
pub struct MemoryStore {
    pub genres: Arc<MemoryCollection<Genre>>,
    pub customers: Arc<MemoryCollection<Customer>>,
    pub movies: Arc<MemoryCollection<Movie>>,
    pub rentals: Arc<MemoryCollection<Rental>>,
    pub users: Arc<MemoryCollection<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// Both ledger operations take the movies lock before the rentals lock.
#[async_trait]
impl RentalLedger for MemoryStore {
    async fn issue(&self, rental: &Rental) -> Result<IssueOutcome, DatabaseError> {
        let mut movies = self.movies.docs.write().await;
        let mut rentals = self.rentals.docs.write().await;

        let movie = match movies.get_mut(&rental.movie.id) {
            Some(movie) if movie.in_stock() => movie,
            Some(_) => return Ok(IssueOutcome::OutOfStock),
            None => return Ok(IssueOutcome::MovieMissing),
        };
        if rentals.contains_key(&rental.id) {
            return Err(DatabaseError::Conflict(format!("rental {} already exists", rental.id)));
        }

        movie.number_in_stock -= 1;
        rentals.insert(rental.id, rental.clone());
        Ok(IssueOutcome::Issued(rental.clone()))
    }

    async fn close(&self, rental: &Rental) -> Result<Rental, DatabaseError> {
        let mut movies = self.movies.docs.write().await;
        let mut rentals = self.rentals.docs.write().await;

        let slot = rentals
            .get_mut(&rental.id)
            .ok_or_else(|| DatabaseError::QueryError(format!("rental {} vanished", rental.id)))?;
        *slot = rental.clone();

        if let Some(movie) = movies.get_mut(&rental.movie.id) {
            movie.number_in_stock = (movie.number_in_stock + 1).min(MAX_STOCK);
        }
        Ok(rental.clone())
    }
}
