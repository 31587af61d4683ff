use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::database::repository::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub is_gold: bool,
}

impl Entity for Customer {
    const NAME: &'static str = "customer";

    fn id(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.name
            .cmp(&b.name)
            .then_with(|| a.phone.cmp(&b.phone))
            .then_with(|| a.is_gold.cmp(&b.is_gold))
            .then_with(|| a.id.cmp(&b.id))
    }
}
