use uuid::Uuid;

use super::ServiceError;
use crate::api::payloads::{LoginPayload, UserPayload};
use crate::api::{required, validate_payload};
use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::database::{DatabaseError, Entity, Store};

/// Registration, login and token issue.
pub struct UserService<'a> {
    store: &'a Store,
    security: &'a SecurityConfig,
}

impl<'a> UserService<'a> {
    pub fn new(store: &'a Store, security: &'a SecurityConfig) -> Self {
        Self { store, security }
    }

    /// Create a non-admin user and sign a token for it.
    pub async fn register(&self, payload: UserPayload) -> Result<(User, String), ServiceError> {
        validate_payload(&payload)?;
        let name = required(payload.name, "name")?;
        let email = required(payload.email, "email")?;
        let password = required(payload.password, "password")?;

        if self.store.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::AlreadyRegistered);
        }

        let password_hash = hash_password(password, self.security.bcrypt_cost)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            is_admin: false,
        };

        // A concurrent registration can still win the unique index.
        let user = match self.store.users.insert(&user).await {
            Ok(user) => user,
            Err(DatabaseError::Conflict(_)) => return Err(ServiceError::AlreadyRegistered),
            Err(err) => return Err(err.into()),
        };

        let token = self.token_for(&user)?;
        tracing::info!("Registered user {}", user.id);
        Ok((user, token))
    }

    pub async fn login(&self, payload: LoginPayload) -> Result<String, ServiceError> {
        validate_payload(&payload)?;
        let email = required(payload.email, "email")?;
        let password = required(payload.password, "password")?;

        let user = self
            .store
            .users
            .find_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let valid = verify_password(password, user.password_hash.clone())
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if !valid {
            return Err(ServiceError::InvalidCredentials);
        }

        self.token_for(&user)
    }

    /// The user behind an authenticated request.
    pub async fn me(&self, id: Uuid) -> Result<User, ServiceError> {
        self.store
            .users
            .find(id)
            .await?
            .ok_or(ServiceError::NotFound(User::NAME))
    }

    fn token_for(&self, user: &User) -> Result<String, ServiceError> {
        let claims = Claims::for_user(user, self.security);
        generate_jwt(&claims, self.security).map_err(|e| ServiceError::Internal(e.to_string()))
    }
}
