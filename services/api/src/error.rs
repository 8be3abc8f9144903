//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lending_ledger_core::{ports::PortError, LedgerError};
use serde_json::json;
use tracing::error;

use crate::config::ConfigError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// A ledger operation was rejected.
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    /// The request could not be interpreted (bad dates, unknown enum values).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The member is not allowed to perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ledger(LedgerError::NotFound(_)) | ApiError::Port(PortError::NotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Ledger(
                LedgerError::OutOfStock(_)
                | LedgerError::AlreadyReturned(_)
                | LedgerError::LoanLimitReached { .. },
            ) => StatusCode::CONFLICT,
            ApiError::Ledger(
                LedgerError::InvalidQuantity(_)
                | LedgerError::InvalidDate(_)
                | LedgerError::InvalidRating(_)
                | LedgerError::InvalidCategory(_),
            )
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Port(_) => StatusCode::BAD_GATEWAY,
            ApiError::Config(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn ledger_errors_map_to_http_statuses() {
        let id = Uuid::new_v4();
        assert_eq!(ApiError::from(LedgerError::OutOfStock(id)).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(LedgerError::AlreadyReturned(id)).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(LedgerError::NotFound("Loan".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(LedgerError::InvalidQuantity("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(LedgerError::InvalidDate("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(LedgerError::InvalidRating(0)).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(LedgerError::InvalidCategory("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
