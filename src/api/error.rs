//! Mapping from the crate error taxonomy onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::error::Error;

/// Wrapper so handlers can return `Result<_, ApiError>` with `?`.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            // Malformed or contradictory requests.
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::MarketNotFound { .. } => StatusCode::NOT_FOUND,
            // Collaborator failures surface with their message; the caller
            // sent a request the exchange would not take.
            Error::Exchange(_) | Error::Http(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            // Startup-class faults leaking into a request path.
            Error::Config(_) | Error::Io(_) | Error::Url(_) => {
                error!(error = %self.0, "internal error during request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
