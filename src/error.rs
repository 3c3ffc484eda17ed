//! Service error types with HTTP status code mapping.
//!
//! [`ServiceError`] is the central error type returned by handlers. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response. [`AcquireError`] and [`StatementError`] are the two failure
//! kinds of the persistence layer.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Entity;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "Customer not found"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Failure to check a connection out of the pool.
#[derive(Debug, thiserror::Error)]
pub enum AcquireError {
    /// Every slot stayed checked out for the whole acquire timeout.
    #[error("timed out after {waited:?} waiting for one of {max_connections} connections")]
    TimedOut {
        /// How long the caller waited.
        waited: Duration,
        /// Configured pool limit.
        max_connections: u32,
    },

    /// The pool was closed before a slot became free.
    #[error("connection pool is closed")]
    Closed,

    /// Opening a new connection failed.
    #[error("failed to open database connection: {0}")]
    Connect(String),
}

/// Failure while executing a statement on a checked-out connection.
#[derive(Debug, thiserror::Error)]
pub enum StatementError {
    /// The database rejected the statement (syntax, constraint, missing table).
    #[error("database rejected statement: {0}")]
    Database(String),

    /// The connection broke while the statement was in flight.
    #[error("connection lost during statement: {0}")]
    ConnectionLost(String),

    /// A returned row did not match the record shape.
    #[error("could not decode result row: {0}")]
    Decode(String),
}

impl StatementError {
    /// Whether the connection that produced this error must be discarded.
    #[must_use]
    pub const fn is_connection_lost(&self) -> bool {
        matches!(self, Self::ConnectionLost(_))
    }
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status               |
/// |-----------|------------|---------------------------|
/// | 1000–1999 | Validation | 400 Bad Request           |
/// | 2000–2999 | Not Found  | 404 Not Found             |
/// | 3000–3999 | Server     | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A keyed lookup or mutation matched no row.
    #[error("{0} not found")]
    NotFound(Entity),

    /// A path parameter could not be bound.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No connection could be acquired.
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquireError),

    /// The statement failed after a connection was acquired.
    #[error("statement error: {0}")]
    Statement(#[from] StatementError),

    /// The full health check could not acquire a connection.
    #[error("health check failed: {0}")]
    HealthCheck(#[source] AcquireError),
}

impl ServiceError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::Acquisition(_) => 3001,
            Self::Statement(_) => 3002,
            Self::HealthCheck(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Acquisition(_) | Self::Statement(_) | Self::HealthCheck(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message sent to the client. Server-side failures stay generic; their
    /// detail only goes to the log.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(_) | Self::InvalidRequest(_) => self.to_string(),
            Self::Acquisition(_) | Self::Statement(_) => "internal server error".to_string(),
            Self::HealthCheck(_) => "health check failed".to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.public_message(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn body_json(err: ServiceError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should be readable");
        };
        let Ok(json) = serde_json::from_slice(&bytes) else {
            panic!("body should be json");
        };
        (status, json)
    }

    #[tokio::test]
    async fn not_found_names_the_entity() {
        let (status, json) = body_json(ServiceError::NotFound(Entity::Customer)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], 2001);
        assert_eq!(json["error"]["message"], "Customer not found");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn statement_failure_hides_detail() {
        let err = ServiceError::from(StatementError::Database("no such table: SELLER".to_string()));
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], 3002);
        assert_eq!(json["error"]["message"], "internal server error");
    }

    #[tokio::test]
    async fn acquisition_failure_is_500() {
        let err = ServiceError::from(AcquireError::Closed);
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], 3001);
    }

    #[tokio::test]
    async fn health_check_failure_message() {
        let err = ServiceError::HealthCheck(AcquireError::Connect("refused".to_string()));
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], "health check failed");
    }

    #[test]
    fn invalid_request_is_400() {
        let err = ServiceError::InvalidRequest("invalid id: abc".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn only_connection_loss_discards() {
        assert!(StatementError::ConnectionLost("reset".to_string()).is_connection_lost());
        assert!(!StatementError::Decode("bad".to_string()).is_connection_lost());
    }
}
