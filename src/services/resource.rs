//! Lookups shared by every collection: identifier parsing and the
//! not-found mapping.

use uuid::Uuid;

use super::ServiceError;
use crate::database::{Entity, Page, Repository};

/// Parse a client-supplied identifier. Malformed values are reported
/// separately from unknown ones.
pub fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::InvalidIdentifier(raw.to_string()))
}

pub async fn find_one<E, R>(repo: &R, raw_id: &str) -> Result<E, ServiceError>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let id = parse_id(raw_id)?;
    repo.find(id).await?.ok_or(ServiceError::NotFound(E::NAME))
}

pub async fn find_page<E, R>(repo: &R, page: Page) -> Result<Vec<E>, ServiceError>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    Ok(repo.list(page).await?)
}

pub async fn replace_existing<E, R>(repo: &R, entity: &E) -> Result<E, ServiceError>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    repo.replace(entity).await?.ok_or(ServiceError::NotFound(E::NAME))
}

pub async fn delete_one<E, R>(repo: &R, raw_id: &str) -> Result<E, ServiceError>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    let id = parse_id(raw_id)?;
    repo.remove(id).await?.ok_or(ServiceError::NotFound(E::NAME))
}
