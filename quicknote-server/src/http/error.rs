//! API error types with IntoResponse
//!
//! Errors are converted to `{"error": <message>, "status": <code>}` JSON
//! bodies with appropriate status codes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quicknote_core::{ErrorBody, ValidationError};

use crate::auth::AuthError;
use crate::upstream::UpstreamError;

/// API error type with HTTP status mapping
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request field missing or malformed (400)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body could not be parsed (400)
    #[error("{message}")]
    BadRequest { message: String },

    /// Bearer token missing or rejected (401)
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// Upstream call failed; `status` is chosen by the route
    #[error("{source}")]
    Upstream {
        status: StatusCode,
        source: UpstreamError,
    },
}

impl ApiError {
    /// Map upstream failures of a route to `status`.
    ///
    /// ```ignore
    /// state.identity.send_otp(&email).await.map_err(ApiError::relay(StatusCode::BAD_REQUEST))?;
    /// ```
    pub fn relay(status: StatusCode) -> impl FnOnce(UpstreamError) -> Self {
        move |source| Self::Upstream { status, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            Self::Upstream { source, .. } if !source.is_rejection() => {
                tracing::error!("Upstream error: {}", source);
            }
            Self::Unauthorized(e) => tracing::debug!("Unauthorized: {:?}", e),
            _ => {}
        }

        let body = ErrorBody {
            error: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest {
            message: rejection.body_text(),
        }
    }
}
