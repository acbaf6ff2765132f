use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use storefront_auth::Role;
use storefront_core::UserId;
use storefront_infra::ServiceError;

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmIResponse {
    pub user_id: UserId,
    pub role: Role,
}

// -------------------------
// Helpers
// -------------------------

/// Unwrap a JSON body, turning extractor rejections into our 400 error shape.
pub fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload.map(|Json(v)| v).map_err(|rejection| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
    })
}

pub fn parse_id<T: FromStr>(raw: &str, what: &'static str) -> Result<T, Response> {
    raw.trim()
        .parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}

/// `200 OK` with a JSON body, or the mapped service error.
pub fn ok_json<T: Serialize>(result: Result<T, ServiceError>) -> Response {
    with_status(StatusCode::OK, result)
}

pub fn with_status<T: Serialize>(status: StatusCode, result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(value) => (status, Json(value)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
