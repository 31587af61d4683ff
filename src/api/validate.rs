use std::collections::HashMap;
use validator::{Validate, ValidationErrors};

use crate::services::ServiceError;

/// A request body checked by [`validate_payload`].
pub trait Payload: Validate {
    /// `(rust_name, wire_name)` for every field, in declaration order. The
    /// first field with a violation supplies the error message.
    const FIELDS: &'static [(&'static str, &'static str)];
}

/// Check `payload` against its field constraints. On failure the error
/// message describes the first violated constraint and `field_errors`
/// carries one message per offending field, keyed by wire name.
pub fn validate_payload<P: Payload>(payload: &P) -> Result<(), ServiceError> {
    match payload.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(to_service_error::<P>(&errors)),
    }
}

/// Unwrap a field the gate has already required.
pub fn required<T>(value: Option<T>, wire_name: &str) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::invalid(format!("\"{}\" is required", wire_name)))
}

fn to_service_error<P: Payload>(errors: &ValidationErrors) -> ServiceError {
    let by_field = errors.field_errors();
    let mut field_errors = HashMap::new();
    let mut first = None;

    for (rust_name, wire_name) in P::FIELDS {
        let Some(errs) = by_field.get(*rust_name).or_else(|| by_field.get(*wire_name)) else {
            continue;
        };
        let Some(err) = errs.first() else {
            continue;
        };
        let message = err
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("\"{}\" is invalid ({})", wire_name, err.code));

        if first.is_none() {
            first = Some(message.clone());
        }
        field_errors.insert(wire_name.to_string(), message);
    }

    ServiceError::Validation {
        message: first.unwrap_or_else(|| "Invalid request body".to_string()),
        field_errors,
    }
}
