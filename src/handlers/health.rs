//! Liveness endpoint

use axum::http::StatusCode;

/// GET /livez - Basic liveness probe.
///
/// Returns 200 immediately without touching the cache or the upstream feed.
pub async fn livez() -> StatusCode {
    StatusCode::OK
}
