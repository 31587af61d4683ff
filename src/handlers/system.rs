use axum::extract::State;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET / - service information
pub async fn root() -> ApiResult<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Ok(ApiResponse::success(json!({
        "name": "Vidly API",
        "version": version,
        "description": "Video rental management REST API",
        "endpoints": {
            "genres": "/api/genres[/:id] (reads public, writes authenticated, delete admin)",
            "movies": "/api/movies[/:id] (reads public, writes authenticated, delete admin)",
            "customers": "/api/customers[/:id] (authenticated, delete admin)",
            "rentals": "/api/rentals[/:id] (authenticated, delete admin)",
            "returns": "/api/returns (authenticated)",
            "users": "/api/users (public registration), /api/users/me (authenticated)",
            "auth": "/api/auth (public login)",
        }
    })))
}

/// GET /health - store connectivity
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "store": state.store.backend_name(),
        }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::service_unavailable("Store unavailable"))
        }
    }
}
