use axum::{
    extract::rejection::PathRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::service::LookupError;

/// Plaintext error response, one line terminated by a newline
pub struct ApiError(pub LookupError);

impl ApiError {
    pub fn missing_param(name: &str) -> Self {
        Self(LookupError::BadRequest(format!(
            "param: {name} requested parameter was not found"
        )))
    }
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        Self(err)
    }
}

/// Undecodable path segments are the caller's fault
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(LookupError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            LookupError::BadRequest(_) => {
                debug!(error = %self.0, "rejected request");
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            LookupError::NotFound(_) => {
                debug!(error = %self.0, "no matching record");
                (StatusCode::NOT_FOUND, self.0.to_string())
            }
            LookupError::Internal(err) => {
                error!(error = %format!("{err:#}"), "lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        // Keep the body to a single line
        let message = message.replace(['\r', '\n'], " ");

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{message}\n"),
        )
            .into_response()
    }
}
