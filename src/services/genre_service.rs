use uuid::Uuid;

use super::resource::{parse_id, replace_existing};
use super::ServiceError;
use crate::api::payloads::GenrePayload;
use crate::api::{required, validate_payload};
use crate::database::models::Genre;
use crate::database::Store;

pub struct GenreService<'a> {
    store: &'a Store,
}

impl<'a> GenreService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: GenrePayload) -> Result<Genre, ServiceError> {
        validate_payload(&payload)?;
        let genre = Self::build(Uuid::new_v4(), payload)?;
        Ok(self.store.genres.insert(&genre).await?)
    }

    /// Full replace. Movies keep the snapshot they were written with.
    pub async fn update(&self, raw_id: &str, payload: GenrePayload) -> Result<Genre, ServiceError> {
        validate_payload(&payload)?;
        let genre = Self::build(parse_id(raw_id)?, payload)?;
        replace_existing(&*self.store.genres, &genre).await
    }

    fn build(id: Uuid, payload: GenrePayload) -> Result<Genre, ServiceError> {
        Ok(Genre {
            id,
            name: required(payload.name, "name")?,
            description: payload.description,
        })
    }
}
