//! Mapping of assignment errors onto HTTP responses

use assignment_core::{AssignmentError, ErrorKind};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError(pub AssignmentError);

impl From<AssignmentError> for ApiError {
    fn from(err: AssignmentError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AssignmentError::validation(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(AssignmentError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NoCapacity => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Store details stay in the logs
        let message = match kind {
            ErrorKind::Internal => {
                error!("Internal error while handling request: {}", self.0);
                "internal error".to_string()
            }
            ErrorKind::NoCapacity => "no agent is available, try again later".to_string(),
            _ => self.0.to_string(),
        };

        (status, Json(ErrorBody { error: kind.as_str(), message })).into_response()
    }
}
