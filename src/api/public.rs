//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::core::ProxyError;
use crate::gateway::GatewayError;

/// Body of every error response
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

// Errors

pub struct ApiError(anyhow::Error);

impl ApiError {
    /// Status code and user facing message for the wrapped error.
    /// Handlers attach a feature specific message as context to
    /// upstream failures so unknown gateway errors read sensibly.
    fn status_and_message(&self) -> (StatusCode, String) {
        if let Some(err) = self.0.downcast_ref::<ProxyError>() {
            let status = if err.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            return (status, err.to_string());
        }

        match self.0.downcast_ref::<GatewayError>() {
            Some(err @ GatewayError::RateLimited) => {
                (StatusCode::TOO_MANY_REQUESTS, err.to_string())
            }
            Some(err @ GatewayError::PaymentRequired) => {
                (StatusCode::PAYMENT_REQUIRED, err.to_string())
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string()),
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        // Always log the error
        if status.is_client_error() {
            tracing::warn!("{:#}", self.0);
        } else {
            tracing::error!("{:#}", self.0);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod poetry {
    pub use crate::api::routes::poetry::public::*;
}
