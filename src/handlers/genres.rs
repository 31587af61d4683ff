use axum::extract::{Path, Query, State};

use crate::api::payloads::GenrePayload;
use crate::api::{ApiJson, PageQuery};
use crate::database::models::Genre;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::resource::{delete_one, find_one, find_page};
use crate::services::GenreService;
use crate::state::AppState;

/// GET /api/genres
pub async fn list(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Vec<Genre>> {
    let page = query.to_page(&state.config.api);
    Ok(ApiResponse::success(find_page(&*state.store.genres, page).await?))
}

/// GET /api/genres/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Genre> {
    Ok(ApiResponse::success(find_one(&*state.store.genres, &id).await?))
}

/// POST /api/genres
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(payload): ApiJson<GenrePayload>,
) -> ApiResult<Genre> {
    let genre = GenreService::new(&state.store).create(payload).await?;
    tracing::info!("User {} created genre {}", user.id, genre.id);
    Ok(ApiResponse::success(genre))
}

/// PUT /api/genres/:id
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<GenrePayload>,
) -> ApiResult<Genre> {
    let genre = GenreService::new(&state.store).update(&id, payload).await?;
    tracing::info!("User {} updated genre {}", user.id, genre.id);
    Ok(ApiResponse::success(genre))
}

/// DELETE /api/genres/:id
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Genre> {
    let genre = delete_one(&*state.store.genres, &id).await?;
    tracing::info!("User {} deleted genre {}", user.id, genre.id);
    Ok(ApiResponse::success(genre))
}
