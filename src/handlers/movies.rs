use axum::extract::{Path, Query, State};

use crate::api::payloads::MoviePayload;
use crate::api::{ApiJson, PageQuery};
use crate::database::models::Movie;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::resource::{delete_one, find_one, find_page};
use crate::services::MovieService;
use crate::state::AppState;

/// GET /api/movies
pub async fn list(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Vec<Movie>> {
    let page = query.to_page(&state.config.api);
    Ok(ApiResponse::success(find_page(&*state.store.movies, page).await?))
}

/// GET /api/movies/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Movie> {
    Ok(ApiResponse::success(find_one(&*state.store.movies, &id).await?))
}

/// POST /api/movies
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<MoviePayload>,
) -> ApiResult<Movie> {
    let movie = MovieService::new(&state.store).create(payload).await?;
    tracing::info!("User {} created movie {}", user.id, movie.id);
    Ok(ApiResponse::success(movie))
}

/// PUT /api/movies/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<MoviePayload>,
) -> ApiResult<Movie> {
    let movie = MovieService::new(&state.store).update(&id, payload).await?;
    tracing::info!("User {} updated movie {}", user.id, movie.id);
    Ok(ApiResponse::success(movie))
}

/// DELETE /api/movies/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Movie> {
    let movie = delete_one(&*state.store.movies, &id).await?;
    tracing::info!("User {} deleted movie {}", user.id, movie.id);
    Ok(ApiResponse::success(movie))
}
