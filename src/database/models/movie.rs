use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use super::genre::GenreSnapshot;
use crate::database::repository::Entity;

/// Upper bound accepted for `numberInStock`. Returns never push stock past it.
pub const MAX_STOCK: i32 = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub genres: Vec<GenreSnapshot>,
    /// Signed so that the unguarded best-effort issue path can be observed
    /// going below zero instead of wrapping.
    pub number_in_stock: i32,
    pub daily_rental_rate: f64,
}

impl Movie {
    pub fn in_stock(&self) -> bool {
        self.number_in_stock > 0
    }
}

impl Entity for Movie {
    const NAME: &'static str = "movie";

    fn id(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.title
            .cmp(&b.title)
            .then_with(|| a.number_in_stock.cmp(&b.number_in_stock))
            .then_with(|| a.daily_rental_rate.total_cmp(&b.daily_rental_rate))
            .then_with(|| a.id.cmp(&b.id))
    }
}
