//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use duskhub_domain::error::DuskHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`DuskHubError`] to an HTTP response with appropriate status code.
pub struct ApiError(DuskHubError);

impl From<DuskHubError> for ApiError {
    fn from(err: DuskHubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DuskHubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            DuskHubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            DuskHubError::Storage(err) | DuskHubError::Transport(err) => {
                tracing::error!(error = %err, kind = %self.0, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
