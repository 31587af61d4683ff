use axum::extract::{Path, Query, State};

use crate::api::payloads::CustomerPayload;
use crate::api::{ApiJson, PageQuery};
use crate::database::models::Customer;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::resource::{delete_one, find_one, find_page};
use crate::services::CustomerService;
use crate::state::AppState;

/// GET /api/customers
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<Customer>> {
    let page = query.to_page(&state.config.api);
    Ok(ApiResponse::success(find_page(&*state.store.customers, page).await?))
}

/// GET /api/customers/:id
pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Customer> {
    Ok(ApiResponse::success(find_one(&*state.store.customers, &id).await?))
}

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<CustomerPayload>,
) -> ApiResult<Customer> {
    let customer = CustomerService::new(&state.store).create(payload).await?;
    tracing::info!("User {} created customer {}", user.id, customer.id);
    Ok(ApiResponse::success(customer))
}

/// PUT /api/customers/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<CustomerPayload>,
) -> ApiResult<Customer> {
    let customer = CustomerService::new(&state.store).update(&id, payload).await?;
    tracing::info!("User {} updated customer {}", user.id, customer.id);
    Ok(ApiResponse::success(customer))
}

/// DELETE /api/customers/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Customer> {
    let customer = delete_one(&*state.store.customers, &id).await?;
    tracing::info!("User {} deleted customer {}", user.id, customer.id);
    Ok(ApiResponse::success(customer))
}
