//! Error handling module.
//!
//! Service code returns [`AppError`]. Handlers attach the [`Operation`] they
//! were performing, producing an [`ApiError`] that knows how to render itself:
//! a missing user is a plain-text 400, anything else is a 500 with a short
//! JSON `error` message.

pub mod operation;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub use operation::Operation;

/// Body returned when the referenced user does not exist.
pub const USER_NOT_FOUND_BODY: &str = "User not found";

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The user id in the path does not resolve to a user.
    #[error("User not found")]
    UserNotFound,

    /// Request input failed validation.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    /// Get the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UserNotFound => StatusCode::BAD_REQUEST,
            Self::Validation(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Attach the operation that failed.
    #[must_use]
    pub fn during(self, operation: Operation) -> ApiError {
        ApiError {
            operation,
            source: self,
        }
    }
}

/// Input validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was not supplied.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A required field was supplied but empty.
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    /// A numeric field could not be parsed.
    #[error("{field} is not a number: {value:?}")]
    InvalidNumber {
        /// Field name.
        field: &'static str,
        /// Raw input.
        value: String,
    },

    /// A date field could not be parsed.
    #[error("{field} is not a valid date: {value:?}")]
    InvalidDate {
        /// Field name.
        field: &'static str,
        /// Raw input.
        value: String,
    },

    /// The request body could not be decoded.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// The query string could not be decoded.
    #[error("malformed query string: {0}")]
    MalformedQuery(String),
}

/// Used when a validation failure escapes without an operation attached,
/// e.g. a [`FormOrJson`](crate::api::extractors::FormOrJson) rejection
/// that a handler did not intercept.
impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request rejected");
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Storage-specific error type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Connection error.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Query execution error.
    #[error("Query failed: {0}")]
    Query(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Identifier is not well-formed for this backend.
    #[error("Malformed id: {0:?}")]
    InvalidId(String),

    /// Backend not available.
    #[error("Storage backend unavailable")]
    Unavailable,
}

/// Error returned from HTTP handlers.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed: {source}")]
pub struct ApiError {
    /// Operation that was being performed.
    pub operation: Operation,
    /// Underlying cause.
    #[source]
    pub source: AppError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.source.status_code();

        metrics::counter!(
            "exercise_tracker_request_failures_total",
            "operation" => self.operation.as_str()
        )
        .increment(1);

        if let AppError::UserNotFound = self.source {
            tracing::warn!(operation = %self.operation, status = %status, "User not found");
            return (status, USER_NOT_FOUND_BODY).into_response();
        }

        tracing::error!(
            operation = %self.operation,
            status = %status,
            error = %self.source,
            "Request failed"
        );

        let body = Json(json!({ "error": self.operation.failure_message() }));
        (status, body).into_response()
    }
}

/// Extension for tagging service results with the failing operation.
pub trait OperationContext<T> {
    /// Convert the error side into an [`ApiError`] for `operation`.
    ///
    /// # Errors
    ///
    /// Returns the wrapped error when `self` is an error.
    fn during(self, operation: Operation) -> std::result::Result<T, ApiError>;
}

impl<T, E> OperationContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn during(self, operation: Operation) -> std::result::Result<T, ApiError> {
        self.map_err(|e| {
            let error: AppError = e.into();
            error.during(operation)
        })
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias using `StorageError`.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
