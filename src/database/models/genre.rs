use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::database::repository::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Copy of a genre taken when a movie is written. Later edits to the
/// genre do not reach movies that already embed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreSnapshot {
    pub id: Uuid,
    pub name: String,
}

impl Genre {
    pub fn snapshot(&self) -> GenreSnapshot {
        GenreSnapshot {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

impl Entity for Genre {
    const NAME: &'static str = "genre";

    fn id(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.name
            .cmp(&b.name)
            .then_with(|| a.description.cmp(&b.description))
            .then_with(|| a.id.cmp(&b.id))
    }
}
