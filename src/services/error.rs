use std::collections::HashMap;
use thiserror::Error;

use crate::database::DatabaseError;

/// Domain failures shared by every service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("Invalid ID.")]
    InvalidIdentifier(String),

    #[error("The {0} with the given ID was not found.")]
    NotFound(&'static str),

    #[error("Movie is out of stock.")]
    OutOfStock,

    #[error("User already registered.")]
    AlreadyRegistered,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error(transparent)]
    Persistence(#[from] DatabaseError),

    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// A validation failure without per-field detail.
    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors: HashMap::new(),
        }
    }

    /// A validation failure attributed to one field.
    pub fn invalid_field(wire_name: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(wire_name.to_string(), message.clone());
        ServiceError::Validation {
            message,
            field_errors,
        }
    }
}
