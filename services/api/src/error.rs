//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! core error maps onto an HTTP response.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use book_exchange_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the marketplace core.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Port(e) => match e {
                PortError::NotFound(_) => StatusCode::NOT_FOUND,
                PortError::Forbidden(_) => StatusCode::FORBIDDEN,
                PortError::Conflict(_) => StatusCode::CONFLICT,
                PortError::Validation(_) => StatusCode::BAD_REQUEST,
                PortError::SessionInvalid | PortError::Unauthorized => StatusCode::UNAUTHORIZED,
                PortError::Persistence(_) | PortError::Unexpected(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Config(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            // Internal details stay in the log.
            error!("Request failed: {}", self);
            "internal server error".to_string()
        } else {
            match &self {
                ApiError::Port(e) => e.to_string(),
                other => other.to_string(),
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
