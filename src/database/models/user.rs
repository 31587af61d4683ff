use serde::Serialize;
use sqlx::FromRow;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::database::repository::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
}

impl Entity for User {
    const NAME: &'static str = "user";

    fn id(&self) -> Uuid {
        self.id
    }

    fn list_order(a: &Self, b: &Self) -> Ordering {
        a.name
            .cmp(&b.name)
            .then_with(|| a.email.cmp(&b.email))
            .then_with(|| a.id.cmp(&b.id))
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.to_lowercase())
    }
}
