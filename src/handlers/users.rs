use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use uuid::Uuid;

use crate::api::payloads::{LoginPayload, UserPayload};
use crate::api::ApiJson;
use crate::auth::AUTH_HEADER;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::UserService;
use crate::state::AppState;

/// Public view of a freshly registered user.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for RegisteredUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/users - register; the token travels in the `x-auth-token`
/// response header.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UserPayload>,
) -> Result<Response, ApiError> {
    let (user, token) = UserService::new(&state.store, &state.config.security)
        .register(payload)
        .await?;

    Ok((
        [(AUTH_HEADER, token)],
        ApiResponse::success(RegisteredUser::from(user)),
    )
        .into_response())
}

/// GET /api/users/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<User> {
    let user = UserService::new(&state.store, &state.config.security)
        .me(user.id)
        .await?;
    Ok(ApiResponse::success(user))
}

/// POST /api/auth - login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginPayload>,
) -> ApiResult<TokenResponse> {
    let token = UserService::new(&state.store, &state.config.security)
        .login(payload)
        .await?;
    Ok(ApiResponse::success(TokenResponse { token }))
}
