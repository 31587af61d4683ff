use async_trait::async_trait;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Rental, User};

/// A document type stored in its own collection.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Lowercase singular name used in client-facing messages.
    const NAME: &'static str;

    fn id(&self) -> Uuid;

    /// Total order used by list queries. Must match the ORDER BY of the
    /// PostgreSQL backend.
    fn list_order(a: &Self, b: &Self) -> Ordering;

    /// Key that must be unique across the collection, if any.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

/// One page of a list query. Page numbers start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.number as u64 - 1) * self.size as u64
    }

    pub fn limit(&self) -> u64 {
        self.size as u64
    }
}

/// Single-document operations over one collection.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<E>, DatabaseError>;

    async fn list(&self, page: Page) -> Result<Vec<E>, DatabaseError>;

    async fn insert(&self, entity: &E) -> Result<E, DatabaseError>;

    /// Replace every mutable field. `None` when no document has the id.
    async fn replace(&self, entity: &E) -> Result<Option<E>, DatabaseError>;

    /// Delete and return the document. `None` when no document has the id.
    async fn remove(&self, id: Uuid) -> Result<Option<E>, DatabaseError>;
}

#[async_trait]
pub trait UserRepository: Repository<User> {
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
}

#[async_trait]
pub trait RentalRepository: Repository<Rental> {
    /// Rental whose snapshots reference both ids. Open rentals win over
    /// returned ones; among equals the newest wins.
    async fn lookup(
        &self,
        customer_id: Uuid,
        movie_id: Uuid,
    ) -> Result<Option<Rental>, DatabaseError>;
}

/// Result of an atomic issue attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueOutcome {
    Issued(Rental),
    /// The movie exists but has no stock left.
    OutOfStock,
    /// The movie was deleted after it was read.
    MovieMissing,
}

/// Writes spanning the movies and rentals collections, each applied as a
/// single transaction.
#[async_trait]
pub trait RentalLedger: Send + Sync {
    /// Decrement the movie's stock if it is positive and insert the rental.
    async fn issue(&self, rental: &Rental) -> Result<IssueOutcome, DatabaseError>;

    /// Persist a closed rental and put one unit back in stock, never past
    /// `MAX_STOCK`. A movie that no longer exists is skipped.
    async fn close(&self, rental: &Rental) -> Result<Rental, DatabaseError>;
}
