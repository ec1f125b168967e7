//! Mapping of service failures to the public error body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::service::ServiceError;

/// Body returned whenever no economic events can be served
pub const EVENTS_UNAVAILABLE_MESSAGE: &str = "Failed to fetch economic events data";

/// Error response for the events API
///
/// Callers always get the same generic message; the underlying cause is only
/// logged.
pub struct ApiError(pub ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "economic events request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": EVENTS_UNAVAILABLE_MESSAGE })),
        )
            .into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}
