//! HTTP error response mapping.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use luxhub_domain::error::LuxhubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`LuxhubError`] to an HTTP response with appropriate status code.
///
/// Denied writes are `403 Forbidden`, explicitly distinct from device
/// failures (`502`) and quota exhaustion (`429`, with `Retry-After`).
pub struct ApiError(LuxhubError);

impl From<LuxhubError> for ApiError {
    fn from(err: LuxhubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            LuxhubError::InvalidSelector(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            LuxhubError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            LuxhubError::PermissionDenied(err) => (StatusCode::FORBIDDEN, err.to_string()),
            LuxhubError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            LuxhubError::RateLimited(err) => {
                let mut response =
                    (StatusCode::TOO_MANY_REQUESTS, Json(ErrorBody { error: err.to_string() }))
                        .into_response();
                if let Ok(value) = HeaderValue::from_str(&err.retry_after_secs.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                return response;
            }
            LuxhubError::DeviceUnreachable(err) => {
                tracing::error!(error = %err, "device cloud error");
                (StatusCode::BAD_GATEWAY, "device cloud unreachable".to_string())
            }
            LuxhubError::PermissionResolutionFailed(err) => {
                tracing::error!(error = %err, "permission resolution failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "permission resolution failed: device directory unavailable".to_string(),
                )
            }
            LuxhubError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
