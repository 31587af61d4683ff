pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::handlers::{customers, genres, movies, rentals, system, users};
use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

/// Build the full HTTP surface over `state`.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(public_routes())
        // Token required
        .merge(authenticated_routes(state.clone()))
        // Token with admin claim required
        .merge(admin_routes(state.clone()))
        .with_state(state.clone())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive());

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/genres", get(genres::list))
        .route("/api/genres/:id", get(genres::get))
        .route("/api/movies", get(movies::list))
        .route("/api/movies/:id", get(movies::get))
        .route("/api/users", post(users::register))
        .route("/api/auth", post(users::login))
}

fn authenticated_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/genres", post(genres::create))
        .route("/api/genres/:id", put(genres::update))
        .route("/api/movies", post(movies::create))
        .route("/api/movies/:id", put(movies::update))
        .route("/api/customers", get(customers::list).post(customers::create))
        .route("/api/customers/:id", get(customers::get).put(customers::update))
        .route("/api/rentals", get(rentals::list).post(rentals::create))
        .route("/api/rentals/:id", get(rentals::get))
        .route("/api/returns", post(rentals::return_rental))
        .route("/api/users/me", get(users::me))
        .route_layer(from_fn_with_state(state, require_auth))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/genres/:id", delete(genres::delete))
        .route("/api/movies/:id", delete(movies::delete))
        .route("/api/customers/:id", delete(customers::delete))
        .route("/api/rentals/:id", delete(rentals::delete))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, require_auth))
}

/// Last-resort handler for panics escaping a request.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!("Request handler panicked: {}", detail);
    ApiError::internal_server_error("Something failed.").into_response()
}
