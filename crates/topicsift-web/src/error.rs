use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use topicsift_amsl::AmslError;
use topicsift_core::{ErrorKind, ExtractError, SourceError};

/// Error returned by every handler, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed form data.
    BadRequest(String),
    Extraction(ExtractError),
    Amsl(AmslError),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Amsl(_) => StatusCode::BAD_REQUEST,
            ApiError::Extraction(e) => match e.kind() {
                ErrorKind::SourceUnreadable => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::ModelInvocationFailure => StatusCode::BAD_GATEWAY,
                ErrorKind::LoopInvariantViolation => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) | ApiError::Internal(msg) => msg.clone(),
            ApiError::Extraction(e) => e.to_string(),
            ApiError::Amsl(e) => e.to_string(),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        ApiError::Extraction(e)
    }
}

impl From<SourceError> for ApiError {
    fn from(e: SourceError) -> Self {
        ApiError::Extraction(ExtractError::from(e))
    }
}

impl From<AmslError> for ApiError {
    fn from(e: AmslError) -> Self {
        ApiError::Amsl(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self.message(), "request failed");
        } else {
            tracing::warn!(%status, error = %self.message(), "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.message() }))).into_response()
    }
}
