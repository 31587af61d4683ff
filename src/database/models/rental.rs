use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use super::{customer::Customer, movie::Movie};
use crate::database::repository::Entity;

/// Customer fields as they were when the rental was issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSnapshot {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub is_gold: bool,
}

/// Movie fields as they were when the rental was issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSnapshot {
    pub id: Uuid,
    pub title: String,
    pub daily_rental_rate: f64,
}

/// A historical receipt. Holds copies, never live references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: Uuid,
    pub customer: CustomerSnapshot,
    pub movie: MovieSnapshot,
    pub date_out: DateTime<Utc>,
    pub date_returned: Option<DateTime<Utc>>,
    pub rental_fee: Option<f64>,
}

impl From<&Customer> for CustomerSnapshot {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            is_gold: customer.is_gold,
        }
    }
}

impl From<&Movie> for MovieSnapshot {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            daily_rental_rate: movie.daily_rental_rate,
        }
    }
}

impl Rental {
    /// Open a new rental dated `now`.
    pub fn issue(customer: &Customer, movie: &Movie, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer: customer.into(),
            movie: movie.into(),
            date_out: now,
            date_returned: None,
            rental_fee: None,
        }
    }

    pub fn is_returned(&self) -> bool {
        self.date_returned.is_some()
    }

    /// Close the rental, charging the daily rate for every whole day
    /// elapsed since `date_out`.
    pub fn close(&mut self, now: DateTime<Utc>) {
        let days = (now - self.date_out).num_days().max(0);
        self.date_returned = Some(now);
        self.rental_fee = Some(days as f64 * self.movie.daily_rental_rate);
    }
}

impl Entity for Rental {
    const NAME: &'static str = "rental";

    fn id(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        b.date_out
            .cmp(&a.date_out)
            .then_with(|| a.customer.name.cmp(&b.customer.name))
            .then_with(|| a.movie.title.cmp(&b.movie.title))
            .then_with(|| a.id.cmp(&b.id))
    }
}
