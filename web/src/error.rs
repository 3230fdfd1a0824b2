//! Error types for web handlers.
//!
//! Every error response shares one envelope:
//! `{statusCode, message, error, timestamp, path}`. Handlers build an
//! [`ApiError`]; its `IntoResponse` impl serializes the envelope and stashes
//! a copy in the response extensions so the
//! [`error_envelope`](crate::middleware::error_envelope) middleware can fill
//! in the request path (and give bare error statuses, like unmatched-route
//! 404s, the same shape).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::fmt;

use flashsale_core::SaleError;

/// Application error type for web handlers.
///
/// Wraps domain errors with an HTTP status; the optional source is for
/// logging only and never leaks to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    source: Option<anyhow::Error>,
}

impl ApiError {
    /// Create an error from a status and user-facing message.
    #[must_use]
    pub const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            source: None,
        }
    }

    /// Attach an internal source error (logged, not exposed).
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message.into())
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|err| err.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<SaleError> for ApiError {
    fn from(err: SaleError) -> Self {
        match &err {
            SaleError::InvalidUserId(_)
            | SaleError::SaleNotStarted
            | SaleError::SaleEnded => Self::bad_request(err.to_string()),
            SaleError::TooManyAttempts { .. } | SaleError::RateLimited => {
                Self::new(StatusCode::TOO_MANY_REQUESTS, err.to_string())
            }
            SaleError::AlreadyPurchased => Self::new(StatusCode::CONFLICT, err.to_string()),
            SaleError::SoldOut => Self::new(StatusCode::GONE, err.to_string()),
            SaleError::StoreUnavailable { .. } | SaleError::QueueUnavailable { .. } => {
                // The internal reason stays in the logs.
                Self::unavailable("Service temporarily unavailable. Please try again.")
                    .with_source(err.into())
            }
            SaleError::Database(_) => {
                Self::internal("Internal server error").with_source(err.into())
            }
        }
    }
}

/// The uniform error envelope, serialized on every error response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// HTTP status code, repeated in the body.
    pub status_code: u16,
    /// User-facing message.
    pub message: String,
    /// Reason phrase for the status (e.g. "Conflict").
    pub error: String,
    /// RFC 3339 timestamp of the failure.
    pub timestamp: String,
    /// Request path; filled in by the envelope middleware.
    pub path: String,
}

impl ErrorBody {
    /// Envelope for a bare status with no handler-supplied message.
    #[must_use]
    pub fn from_status(status: StatusCode, path: &str) -> Self {
        let reason = status.canonical_reason().unwrap_or("Error");
        Self {
            status_code: status.as_u16(),
            message: reason.to_string(),
            error: reason.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            path: path.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Internal failures get logged with their source; client errors are
        // expected traffic.
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    "Request failed"
                ),
            }
        }

        let body = ErrorBody {
            status_code: self.status.as_u16(),
            message: self.message,
            error: self
                .status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            timestamp: Utc::now().to_rfc3339(),
            path: String::new(),
        };

        let mut response = (self.status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}
