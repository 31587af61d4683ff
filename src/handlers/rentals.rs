use axum::extract::{Path, Query, State};

use crate::api::payloads::{RentalPayload, ReturnPayload};
use crate::api::{ApiJson, PageQuery};
use crate::database::models::Rental;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::resource::{delete_one, find_one, find_page};
use crate::services::RentalService;
use crate::state::AppState;

/// GET /api/rentals - newest first
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<Rental>> {
    let page = query.to_page(&state.config.api);
    Ok(ApiResponse::success(find_page(&*state.store.rentals, page).await?))
}

/// GET /api/rentals/:id
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Rental> {
    Ok(ApiResponse::success(find_one(&*state.store.rentals, &id).await?))
}

/// POST /api/rentals - issue a movie to a customer
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<RentalPayload>,
) -> ApiResult<Rental> {
    let rental = RentalService::new(&state.store, &state.config.rentals)
        .issue(payload)
        .await?;
    tracing::debug!("Rental {} issued by user {}", rental.id, user.id);
    Ok(ApiResponse::success(rental))
}

/// DELETE /api/rentals/:id - removes the record only; stock is left alone
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Rental> {
    let rental = delete_one(&*state.store.rentals, &id).await?;
    tracing::info!("User {} deleted rental {}", user.id, rental.id);
    Ok(ApiResponse::success(rental))
}

/// POST /api/returns
pub async fn return_rental(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<ReturnPayload>,
) -> ApiResult<Rental> {
    let rental = RentalService::new(&state.store, &state.config.rentals)
        .return_rental(payload)
        .await?;
    tracing::debug!("Rental {} returned by user {}", rental.id, user.id);
    Ok(ApiResponse::success(rental))
}
