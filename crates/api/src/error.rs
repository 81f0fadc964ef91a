use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};

use common::Error;

/// Maps core errors onto HTTP responses.
///
/// Caller mistakes become 4xx with the message; anything else is reported as
/// a generic failure with the underlying message under `detail`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Error::SymbolNotFound(_) => StatusCode::NOT_FOUND,
            Error::Http(_) | Error::Data(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = if status.is_client_error() {
            warn!(%status, error = %self.0, "Request rejected");
            json!({ "error": self.0.to_string() })
        } else {
            error!(%status, error = %self.0, "Request failed");
            json!({ "error": "prediction failed", "detail": self.0.to_string() })
        };

        (status, Json(body)).into_response()
    }
}
