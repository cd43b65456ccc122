/// HTTP mapping for the shared `CoreError` type.
///
/// This module provides the `IntoResponse` impl that lets route handlers
/// propagate `trigger_fanout_shared::CoreError` with `?`. All handlers should
/// return `Result<T, CoreError>`.
///
/// # Example
///
/// ```
/// use trigger_fanout_shared::CoreError;
/// use axum::Json;
///
/// async fn handler() -> Result<Json<serde_json::Value>, CoreError> {
///     Ok(Json(serde_json::json!({ "ok": true })))
/// }
/// ```
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use trigger_fanout_shared::CoreError;

/// Error response format, matching the Redfish `error` envelope used
/// throughout the fan-out responses so API errors and plugin errors look
/// the same to a caller.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Wraps `CoreError` so this crate can provide the `IntoResponse` impl
/// without `trigger-fanout-shared` taking on an `axum` dependency.
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self.0 {
            CoreError::Auth(msg) => (StatusCode::UNAUTHORIZED, "NoValidSession", msg),
            CoreError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "PropertyUnknown", msg),
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "ResourceNotFound", msg),
            CoreError::PluginTransport(msg) => (StatusCode::BAD_GATEWAY, "PluginTransportError", msg),
            CoreError::PluginAuth(msg) => (StatusCode::UNAUTHORIZED, "ResourceAtUriUnauthorized", msg),
            CoreError::TaskService(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError", msg),
            CoreError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalError",
                    "An internal error occurred".to_string(),
                )
            }
            CoreError::Cancelled => (
                StatusCode::BAD_REQUEST,
                "TaskCancelled",
                "The operation was cancelled".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response = ApiError(CoreError::NotFound("Trigger/t1".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn auth_maps_to_401() {
        let response = ApiError(CoreError::Auth("no valid session".into())).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
