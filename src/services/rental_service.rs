//! Rental issuance and return.
//!
//! Issuing touches two collections. With `rentals.atomic_issue` set the
//! insert and the stock decrement go through the rental ledger as one
//! transaction whose decrement only applies while stock is positive. With
//! it cleared the two writes are sequenced through the plain repositories:
//! a failed stock write then leaves the rental in place and the caller sees
//! a persistence error.

use chrono::Utc;

use super::resource::{find_one, parse_id};
use super::ServiceError;
use crate::api::payloads::{RentalPayload, ReturnPayload};
use crate::api::{required, validate_payload};
use crate::config::RentalsConfig;
use crate::database::models::{Customer, Movie, Rental};
use crate::database::{IssueOutcome, Store};

pub struct RentalService<'a> {
    store: &'a Store,
    config: &'a RentalsConfig,
}

impl<'a> RentalService<'a> {
    pub fn new(store: &'a Store, config: &'a RentalsConfig) -> Self {
        Self { store, config }
    }

    pub async fn issue(&self, payload: RentalPayload) -> Result<Rental, ServiceError> {
        validate_payload(&payload)?;
        let customer_id = required(payload.customer_id, "customerId")?;
        let movie_id = required(payload.movie_id, "movieId")?;

        let customer: Customer = find_one(&*self.store.customers, &customer_id).await?;
        let mut movie: Movie = find_one(&*self.store.movies, &movie_id).await?;

        if !movie.in_stock() {
            return Err(ServiceError::OutOfStock);
        }

        let rental = Rental::issue(&customer, &movie, Utc::now());

        if self.config.atomic_issue {
            return match self.store.ledger.issue(&rental).await? {
                IssueOutcome::Issued(rental) => {
                    tracing::info!(
                        "Issued rental {} of movie {} to customer {}",
                        rental.id,
                        movie.id,
                        customer.id
                    );
                    Ok(rental)
                }
                IssueOutcome::OutOfStock => Err(ServiceError::OutOfStock),
                IssueOutcome::MovieMissing => Err(ServiceError::NotFound("movie")),
            };
        }

        let rental = self.store.rentals.insert(&rental).await?;

        movie.number_in_stock -= 1;
        if let Err(err) = self.store.movies.replace(&movie).await {
            tracing::error!(
                "Rental {} persisted but stock of movie {} was not decremented: {}",
                rental.id,
                movie.id,
                err
            );
            return Err(err.into());
        }

        tracing::info!(
            "Issued rental {} of movie {} to customer {}",
            rental.id,
            movie.id,
            customer.id
        );
        Ok(rental)
    }

    /// Close the customer's rental of the movie and charge for it.
    pub async fn return_rental(&self, payload: ReturnPayload) -> Result<Rental, ServiceError> {
        validate_payload(&payload)?;
        let customer_id = parse_id(&required(payload.customer_id, "customerId")?)?;
        let movie_id = parse_id(&required(payload.movie_id, "movieId")?)?;

        let mut rental = self
            .store
            .rentals
            .lookup(customer_id, movie_id)
            .await?
            .ok_or(ServiceError::NotFound("rental"))?;

        if rental.is_returned() {
            return Err(ServiceError::invalid("Return already processed."));
        }

        rental.close(Utc::now());
        let rental = self.store.ledger.close(&rental).await?;

        tracing::info!(
            "Closed rental {} with fee {:?}",
            rental.id,
            rental.rental_fee
        );
        Ok(rental)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::{MemoryCollection, MemoryStore};
    use crate::database::{DatabaseError, Page, Repository};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Movie collection whose writes always fail.
    struct BrokenMovies {
        inner: Arc<MemoryCollection<Movie>>,
    }

    #[async_trait]
    impl Repository<Movie> for BrokenMovies {
        async fn find(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
            self.inner.find(id).await
        }

        async fn list(&self, page: Page) -> Result<Vec<Movie>, DatabaseError> {
            self.inner.list(page).await
        }

        async fn insert(&self, movie: &Movie) -> Result<Movie, DatabaseError> {
            self.inner.insert(movie).await
        }

        async fn replace(&self, _movie: &Movie) -> Result<Option<Movie>, DatabaseError> {
            Err(DatabaseError::QueryError("connection reset".to_string()))
        }

        async fn remove(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
            self.inner.remove(id).await
        }
    }

    /// Movie collection where a document disappears right after it is read,
    /// as if deleted by a concurrent request.
    struct VanishingMovies {
        inner: Arc<MemoryCollection<Movie>>,
    }

    #[async_trait]
    impl Repository<Movie> for VanishingMovies {
        async fn find(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
            let found = self.inner.find(id).await?;
            self.inner.remove(id).await?;
            Ok(found)
        }

        async fn list(&self, page: Page) -> Result<Vec<Movie>, DatabaseError> {
            self.inner.list(page).await
        }

        async fn insert(&self, movie: &Movie) -> Result<Movie, DatabaseError> {
            self.inner.insert(movie).await
        }

        async fn replace(&self, movie: &Movie) -> Result<Option<Movie>, DatabaseError> {
            self.inner.replace(movie).await
        }

        async fn remove(&self, id: Uuid) -> Result<Option<Movie>, DatabaseError> {
            self.inner.remove(id).await
        }
    }

    struct Fixture {
        mem: Arc<MemoryStore>,
        store: Store,
        customer: Customer,
        movie: Movie,
    }

    async fn fixture(stock: i32) -> Fixture {
        let mem = Arc::new(MemoryStore::new());
        let store = Store::from_memory(mem.clone());

        let customer = Customer {
            id: Uuid::new_v4(),
            name: "Mosh Hamedani".to_string(),
            phone: "555-0100".to_string(),
            is_gold: false,
        };
        let movie = Movie {
            id: Uuid::new_v4(),
            title: "Terminator".to_string(),
            genres: vec![],
            number_in_stock: stock,
            daily_rental_rate: 2.5,
        };
        store.customers.insert(&customer).await.unwrap();
        store.movies.insert(&movie).await.unwrap();

        Fixture {
            mem,
            store,
            customer,
            movie,
        }
    }

    fn payload(customer: &Customer, movie: &Movie) -> RentalPayload {
        RentalPayload {
            customer_id: Some(customer.id.to_string()),
            movie_id: Some(movie.id.to_string()),
        }
    }

    fn returning(customer: &Customer, movie: &Movie) -> ReturnPayload {
        ReturnPayload {
            customer_id: Some(customer.id.to_string()),
            movie_id: Some(movie.id.to_string()),
        }
    }

    fn config(atomic_issue: bool) -> RentalsConfig {
        RentalsConfig { atomic_issue }
    }

    async fn rental_count(store: &Store) -> usize {
        store.rentals.list(Page::new(1, 100)).await.unwrap().len()
    }

    async fn stock(store: &Store, movie: &Movie) -> i32 {
        store.movies.find(movie.id).await.unwrap().unwrap().number_in_stock
    }

    #[tokio::test]
    async fn issue_snapshots_and_decrements_once_in_both_modes() {
        for atomic in [true, false] {
            let fx = fixture(1).await;
            let config = config(atomic);
            let service = RentalService::new(&fx.store, &config);

            let rental = service.issue(payload(&fx.customer, &fx.movie)).await.unwrap();
            assert_eq!(rental.customer.name, "Mosh Hamedani");
            assert!(!rental.customer.is_gold);
            assert_eq!(rental.movie.title, "Terminator");
            assert_eq!(rental.movie.daily_rental_rate, 2.5);
            assert!(rental.date_returned.is_none());
            assert_eq!(stock(&fx.store, &fx.movie).await, 0);

            let err = service.issue(payload(&fx.customer, &fx.movie)).await.unwrap_err();
            assert!(matches!(err, ServiceError::OutOfStock));
            assert_eq!(rental_count(&fx.store).await, 1);
            assert_eq!(stock(&fx.store, &fx.movie).await, 0);
        }
    }

    #[tokio::test]
    async fn out_of_stock_writes_nothing() {
        let fx = fixture(0).await;
        let config = config(true);
        let err = RentalService::new(&fx.store, &config)
            .issue(payload(&fx.customer, &fx.movie))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::OutOfStock));
        assert_eq!(rental_count(&fx.store).await, 0);
        assert_eq!(stock(&fx.store, &fx.movie).await, 0);
    }

    #[tokio::test]
    async fn unknown_customer_or_movie_writes_nothing() {
        let fx = fixture(2).await;
        let config = config(false);
        let service = RentalService::new(&fx.store, &config);

        let ghost = Customer {
            id: Uuid::new_v4(),
            ..fx.customer.clone()
        };
        let err = service.issue(payload(&ghost, &fx.movie)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("customer")));

        let missing = Movie {
            id: Uuid::new_v4(),
            ..fx.movie.clone()
        };
        let err = service.issue(payload(&fx.customer, &missing)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("movie")));

        assert_eq!(rental_count(&fx.store).await, 0);
        assert_eq!(stock(&fx.store, &fx.movie).await, 2);
    }

    #[tokio::test]
    async fn malformed_ids_are_reported_before_lookup() {
        let fx = fixture(1).await;
        let config = config(true);
        let err = RentalService::new(&fx.store, &config)
            .issue(RentalPayload {
                customer_id: Some("12345".to_string()),
                movie_id: Some(fx.movie.id.to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn best_effort_stock_failure_leaves_rental_behind() {
        let fx = fixture(1).await;
        let mut store = fx.store.clone();
        store.movies = Arc::new(BrokenMovies {
            inner: fx.mem.movies.clone(),
        });
        let config = config(false);

        let err = RentalService::new(&store, &config)
            .issue(payload(&fx.customer, &fx.movie))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Persistence(_)));
        assert_eq!(rental_count(&store).await, 1);
        assert_eq!(stock(&store, &fx.movie).await, 1);
    }

    #[tokio::test]
    async fn atomic_issue_ignores_movie_repository_writes() {
        let fx = fixture(1).await;
        let mut store = fx.store.clone();
        store.movies = Arc::new(BrokenMovies {
            inner: fx.mem.movies.clone(),
        });
        let config = config(true);

        RentalService::new(&store, &config)
            .issue(payload(&fx.customer, &fx.movie))
            .await
            .unwrap();
        assert_eq!(stock(&store, &fx.movie).await, 0);
    }

    #[tokio::test]
    async fn atomic_issue_of_movie_deleted_mid_request_is_not_found() {
        let fx = fixture(3).await;
        let mut store = fx.store.clone();
        store.movies = Arc::new(VanishingMovies {
            inner: fx.mem.movies.clone(),
        });
        let config = config(true);

        let err = RentalService::new(&store, &config)
            .issue(payload(&fx.customer, &fx.movie))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::NotFound("movie")));
        assert_eq!(rental_count(&store).await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_atomic_issues_yield_one_rental() {
        let fx = fixture(1).await;
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = fx.store.clone();
            let request = payload(&fx.customer, &fx.movie);
            handles.push(tokio::spawn(async move {
                let config = RentalsConfig { atomic_issue: true };
                RentalService::new(&store, &config).issue(request).await
            }));
        }

        let mut issued = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => issued += 1,
                Err(ServiceError::OutOfStock) => {}
                Err(other) => panic!("unexpected {:?}", other),
            }
        }

        assert_eq!(issued, 1);
        assert_eq!(rental_count(&fx.store).await, 1);
        assert_eq!(stock(&fx.store, &fx.movie).await, 0);
    }

    #[tokio::test]
    async fn return_charges_whole_days_and_restores_stock() {
        let fx = fixture(1).await;
        let config = config(true);
        let service = RentalService::new(&fx.store, &config);

        let mut rental = service.issue(payload(&fx.customer, &fx.movie)).await.unwrap();
        rental.date_out = Utc::now() - Duration::days(3) - Duration::hours(2);
        fx.store.rentals.replace(&rental).await.unwrap();

        let closed = service
            .return_rental(returning(&fx.customer, &fx.movie))
            .await
            .unwrap();
        assert!(closed.date_returned.is_some());
        assert_eq!(closed.rental_fee, Some(7.5));
        assert_eq!(stock(&fx.store, &fx.movie).await, 1);

        let err = service
            .return_rental(returning(&fx.customer, &fx.movie))
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation { message, .. } => {
                assert_eq!(message, "Return already processed.")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn return_without_rental_is_not_found() {
        let fx = fixture(1).await;
        let config = config(true);
        let err = RentalService::new(&fx.store, &config)
            .return_rental(returning(&fx.customer, &fx.movie))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("rental")));
    }
}
