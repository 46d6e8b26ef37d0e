//! HTTP error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

use bhasha_core::error::PipelineError;
use bhasha_core::types::ParseModalityError;
use bhasha_core::validation::ValidationError;

pub type ApiResult<T> = Result<T, ApiError>;

/// An error rendered as `{"detail": "..."}` with a matching status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }
}

/// Status code for a pipeline failure.
pub fn status_for(err: &PipelineError) -> StatusCode {
    if err.is_client_error() {
        return StatusCode::BAD_REQUEST;
    }
    match err {
        PipelineError::Upstream { timeout: true, .. } => StatusCode::GATEWAY_TIMEOUT,
        PipelineError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            error!(kind = err.kind(), error = %err, "Request failed");
        } else {
            warn!(kind = err.kind(), error = %err, "Request rejected");
        }

        #[cfg(feature = "metrics")]
        crate::metrics::record_error(err.kind());

        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        PipelineError::from(err).into()
    }
}

impl From<ParseModalityError> for ApiError {
    fn from(err: ParseModalityError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
