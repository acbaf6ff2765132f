use axum::{extract::Extension, http::StatusCode, Json};

use crate::app::dto::WhoAmIResponse;
use crate::context::UserContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(user): Extension<UserContext>) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        user_id: user.user_id(),
        role: user.role(),
    })
}
