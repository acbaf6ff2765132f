use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use storefront_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        ServiceError::InvalidInput(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_input", msg),
        ServiceError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::Transient(msg) => {
            tracing::warn!(error = %msg, "backing store unavailable");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                "service temporarily unavailable, retry later",
            )
        }
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "internal error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
