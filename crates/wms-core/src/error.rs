//! Error types for the wms client toolkit.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, validation, input, and storage failures.

use std::fmt;
use thiserror::Error;

/// The unified error type for wms client operations.
///
/// This error type covers all possible failure modes in the toolkit,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (invalid credentials, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// API errors (non-2xx responses from the backend).
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Field-level validation errors from the backend.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Input validation errors (invalid API URL, tenant slug).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Session storage errors (persistence I/O, serialization).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No session is active for an operation that requires one.
    #[error("not authenticated")]
    NotAuthenticated,

    /// No refresh token is available to recover an expired session.
    #[error("refresh token missing")]
    RefreshTokenMissing,

    /// Token refresh was attempted and failed; the session has been cleared.
    #[error("session refresh failed: {reason}")]
    RefreshFailed { reason: String },
}

/// API errors from backend responses.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this response signals an expired or missing credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// The offending field, as reported by the server.
    pub field: String,
    /// Human-readable description of the failure.
    pub message: String,
}

/// Field-level validation errors, surfaced for inline display.
#[derive(Debug)]
pub struct ValidationError {
    /// All reported violations, in server order.
    pub violations: Vec<FieldViolation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid tenant slug format.
    #[error("invalid tenant slug '{value}': {reason}")]
    TenantSlug { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Session storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Storage-backend specific failure.
    #[error("{message}")]
    Other { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_code_and_message() {
        let err = ApiError::new(
            401,
            Some("Unauthorized".to_string()),
            Some("Invalid credentials or tenant".to_string()),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("401"));
        assert!(rendered.contains("Unauthorized"));
        assert!(rendered.contains("Invalid credentials or tenant"));
    }

    #[test]
    fn unauthorized_is_status_driven() {
        assert!(ApiError::new(401, None, None).is_unauthorized());
        assert!(!ApiError::new(403, None, None).is_unauthorized());
    }

    #[test]
    fn validation_error_joins_violations() {
        let err = ValidationError {
            violations: vec![
                FieldViolation {
                    field: "username".to_string(),
                    message: "too short".to_string(),
                },
                FieldViolation {
                    field: "password".to_string(),
                    message: "must contain a digit".to_string(),
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "username: too short; password: must contain a digit"
        );
    }
}
