use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::Response,
    routing::get,
    Router,
};

use storefront_core::ProductId;

use crate::app::dto;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> Response {
    dto::ok_json(services.catalog.list_active().await)
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: ProductId = match dto::parse_id(&id, "product") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    dto::ok_json(services.catalog.get_active(id).await)
}
