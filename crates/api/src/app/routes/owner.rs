//! Catalog management for store owners (`role == owner`).

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};

use storefront_catalog::{NewProduct, ProductUpdate};
use storefront_core::ProductId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::UserContext;
use crate::middleware;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_my_products).post(create_product))
        .route("/:id", put(update_product).delete(delete_product))
        .route_layer(axum::middleware::from_fn(middleware::require_owner))
}

pub async fn list_my_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> Response {
    dto::ok_json(services.catalog.list_mine(user.user_id()).await)
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    dto::with_status(
        StatusCode::CREATED,
        services.catalog.create(user.user_id(), body).await,
    )
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> Response {
    let id: ProductId = match dto::parse_id(&id, "product") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    dto::ok_json(services.catalog.update(id, body).await)
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: ProductId = match dto::parse_id(&id, "product") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match services.catalog.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
