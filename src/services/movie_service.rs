use futures::future::try_join_all;
use uuid::Uuid;

use super::resource::{parse_id, replace_existing};
use super::ServiceError;
use crate::api::payloads::MoviePayload;
use crate::api::{required, validate_payload};
use crate::database::models::{GenreSnapshot, Movie};
use crate::database::Store;

const INVALID_GENRE: &str = "Invalid genre.";
const TITLE_LENGTH: &str = "\"title\" length must be between 5 and 255 characters";

pub struct MovieService<'a> {
    store: &'a Store,
}

impl<'a> MovieService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: MoviePayload) -> Result<Movie, ServiceError> {
        validate_payload(&payload)?;
        let movie = self.build(Uuid::new_v4(), payload).await?;
        Ok(self.store.movies.insert(&movie).await?)
    }

    pub async fn update(&self, raw_id: &str, payload: MoviePayload) -> Result<Movie, ServiceError> {
        validate_payload(&payload)?;
        let id = parse_id(raw_id)?;
        let movie = self.build(id, payload).await?;
        replace_existing(&*self.store.movies, &movie).await
    }

    async fn build(&self, id: Uuid, payload: MoviePayload) -> Result<Movie, ServiceError> {
        let title = required(payload.title, "title")?.trim().to_string();
        // The gate measures the raw value; padding must not count toward the minimum.
        if !(5..=255).contains(&title.chars().count()) {
            return Err(ServiceError::invalid_field("title", TITLE_LENGTH));
        }
        let genre_ids = required(payload.genre_ids, "genreIds")?;
        let number_in_stock = required(payload.number_in_stock, "numberInStock")?;
        let daily_rental_rate = required(payload.daily_rental_rate, "dailyRentalRate")?;

        let number_in_stock = i32::try_from(number_in_stock)
            .map_err(|_| ServiceError::invalid("\"numberInStock\" must be between 0 and 255"))?;
        let genres = self.resolve_genres(&genre_ids).await?;

        Ok(Movie {
            id,
            title,
            genres,
            number_in_stock,
            daily_rental_rate,
        })
    }

    /// Copy every referenced genre into the movie. Lookups run concurrently
    /// and the list keeps the order the client sent.
    async fn resolve_genres(&self, raw_ids: &[String]) -> Result<Vec<GenreSnapshot>, ServiceError> {
        let lookups = raw_ids.iter().map(|raw| async move {
            let id = parse_id(raw).map_err(|_| ServiceError::invalid(INVALID_GENRE))?;
            match self.store.genres.find(id).await? {
                Some(genre) => Ok(genre.snapshot()),
                None => Err(ServiceError::invalid(INVALID_GENRE)),
            }
        });
        try_join_all(lookups).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Genre;
    use crate::database::Page;

    async fn seed_genre(store: &Store, name: &str) -> Genre {
        let genre = Genre {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
        };
        store.genres.insert(&genre).await.unwrap()
    }

    fn payload(title: &str, genre_ids: Vec<String>) -> MoviePayload {
        MoviePayload {
            title: Some(title.to_string()),
            genre_ids: Some(genre_ids),
            number_in_stock: Some(3),
            daily_rental_rate: Some(2.5),
        }
    }

    #[tokio::test]
    async fn create_embeds_genre_snapshots_in_order() {
        let store = Store::memory();
        let drama = seed_genre(&store, "Drama").await;
        let comedy = seed_genre(&store, "Comedy").await;

        let movie = MovieService::new(&store)
            .create(payload(
                "  The Apartment ",
                vec![drama.id.to_string(), comedy.id.to_string()],
            ))
            .await
            .unwrap();

        assert_eq!(movie.title, "The Apartment");
        assert_eq!(movie.genres, vec![drama.snapshot(), comedy.snapshot()]);
        assert_eq!(movie.number_in_stock, 3);
    }

    #[tokio::test]
    async fn genre_edits_do_not_reach_existing_movies() {
        let store = Store::memory();
        let drama = seed_genre(&store, "Drama").await;
        let movie = MovieService::new(&store)
            .create(payload("Casablanca", vec![drama.id.to_string()]))
            .await
            .unwrap();

        let renamed = Genre {
            name: "Melodrama".to_string(),
            ..drama.clone()
        };
        store.genres.replace(&renamed).await.unwrap();

        let stored = store.movies.find(movie.id).await.unwrap().unwrap();
        assert_eq!(stored.genres[0].name, "Drama");
    }

    #[tokio::test]
    async fn unknown_or_malformed_genre_is_invalid() {
        let store = Store::memory();
        let service = MovieService::new(&store);

        for raw in [Uuid::new_v4().to_string(), "nonsense".to_string()] {
            let err = service.create(payload("Casablanca", vec![raw])).await.unwrap_err();
            match err {
                ServiceError::Validation { message, .. } => assert_eq!(message, INVALID_GENRE),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn padded_short_title_is_rejected_after_trimming() {
        let store = Store::memory();
        let drama = seed_genre(&store, "Drama").await;
        let service = MovieService::new(&store);

        let err = service
            .create(payload("   abc   ", vec![drama.id.to_string()]))
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation { message, field_errors } => {
                assert_eq!(message, TITLE_LENGTH);
                assert_eq!(field_errors.get("title").map(String::as_str), Some(TITLE_LENGTH));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(store.movies.list(Page::new(1, 10)).await.unwrap().is_empty());

        let movie = service
            .create(payload("Casablanca", vec![drama.id.to_string()]))
            .await
            .unwrap();
        let err = service
            .update(&movie.id.to_string(), payload("   abc   ", vec![drama.id.to_string()]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
        let stored = store.movies.find(movie.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Casablanca");
    }

    #[tokio::test]
    async fn update_of_missing_movie_is_not_found() {
        let store = Store::memory();
        let err = MovieService::new(&store)
            .update(&Uuid::new_v4().to_string(), payload("Casablanca", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("movie")));
    }
}
