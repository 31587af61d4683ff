use uuid::Uuid;

use super::resource::{parse_id, replace_existing};
use super::ServiceError;
use crate::api::payloads::CustomerPayload;
use crate::api::{required, validate_payload};
use crate::database::models::Customer;
use crate::database::Store;

pub struct CustomerService<'a> {
    store: &'a Store,
}

impl<'a> CustomerService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: CustomerPayload) -> Result<Customer, ServiceError> {
        validate_payload(&payload)?;
        let customer = Self::build(Uuid::new_v4(), payload)?;
        Ok(self.store.customers.insert(&customer).await?)
    }

    pub async fn update(
        &self,
        raw_id: &str,
        payload: CustomerPayload,
    ) -> Result<Customer, ServiceError> {
        validate_payload(&payload)?;
        let customer = Self::build(parse_id(raw_id)?, payload)?;
        replace_existing(&*self.store.customers, &customer).await
    }

    fn build(id: Uuid, payload: CustomerPayload) -> Result<Customer, ServiceError> {
        Ok(Customer {
            id,
            name: required(payload.name, "name")?,
            phone: required(payload.phone, "phone")?,
            is_gold: payload.is_gold.unwrap_or(false),
        })
    }
}
