use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims, AUTH_HEADER};
use crate::error::ApiError;
use crate::state::AppState;

const NO_TOKEN: &str = "Access denied. No token provided.";
const INVALID_TOKEN: &str = "Invalid token.";
const NOT_ADMIN: &str = "Access denied. Admin privilege required.";

/// Identity decoded from a verified token. Inserted into the request
/// extensions by [`require_auth`]; handlers take it as an argument.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            is_admin: claims.is_admin,
        }
    }
}

/// Reject requests without a valid `x-auth-token`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers()).ok_or_else(|| ApiError::unauthorized(NO_TOKEN))?;

    let claims = validate_jwt(&token, &state.config.security).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::unauthorized(INVALID_TOKEN)
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Must run after [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized(NO_TOKEN))?;

    if !user.is_admin {
        tracing::warn!("User {} denied admin operation {}", user.id, request.uri().path());
        return Err(ApiError::forbidden(NOT_ADMIN));
    }
    Ok(next.run(request).await)
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTH_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized(NO_TOKEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_jwt;
    use crate::config::AppConfig;
    use crate::database::models::User;
    use crate::database::Store;
    use axum::{
        body::{to_bytes, Body},
        http::StatusCode,
        middleware::{from_fn, from_fn_with_state},
        routing::get,
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn whoami(user: AuthUser) -> String {
        user.id.to_string()
    }

    fn state() -> AppState {
        AppState::new(AppConfig::for_tests(), Store::memory())
    }

    fn router(state: AppState) -> Router {
        let admin: Router<AppState> = Router::new()
            .route("/admin", get(whoami))
            .route_layer(from_fn(require_admin));
        Router::new()
            .route("/me", get(whoami))
            .merge(admin)
            .route_layer(from_fn_with_state(state.clone(), require_auth))
            .with_state(state)
    }

    fn token(state: &AppState, is_admin: bool) -> (Uuid, String) {
        let user = User {
            id: Uuid::new_v4(),
            name: "Grace Hopper".to_string(),
            email: "grace@example.com".to_string(),
            password_hash: String::new(),
            is_admin,
        };
        let security = &state.config.security;
        let token = generate_jwt(&Claims::for_user(&user, security), security).unwrap();
        (user.id, token)
    }

    async fn call(state: &AppState, path: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut request = axum::http::Request::builder().uri(path);
        if let Some(token) = token {
            request = request.header(AUTH_HEADER, token);
        }
        let response = router(state.clone())
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn error_of(body: &str) -> String {
        let value: Value = serde_json::from_str(body).unwrap();
        value["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let state = state();
        let (status, body) = call(&state, "/me", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), NO_TOKEN);
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let state = state();
        let (status, body) = call(&state, "/me", Some("not.a.jwt")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), INVALID_TOKEN);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_identity() {
        let state = state();
        let (id, token) = token(&state, false);
        let (status, body) = call(&state, "/me", Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, id.to_string());
    }

    #[tokio::test]
    async fn admin_route_requires_admin_claim() {
        let state = state();
        let (_, user_token) = token(&state, false);
        let (status, body) = call(&state, "/admin", Some(&user_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(error_of(&body), NOT_ADMIN);

        let (id, admin_token) = token(&state, true);
        let (status, body) = call(&state, "/admin", Some(&admin_token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, id.to_string());
    }
}
