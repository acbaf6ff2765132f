use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::Response,
    routing::{delete, get, post, put},
    Json, Router,
};

use storefront_core::{LineItemId, ProductId};

use crate::app::dto::{self, AddToCartRequest, UpdateQuantityRequest};
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(get_cart))
        .route("/add", post(add_to_cart))
        .route("/update/:item_id", put(update_item))
        .route("/remove/:item_id", delete(remove_item))
        .route("/clear", delete(clear_cart))
}

pub async fn get_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> Response {
    dto::ok_json(services.cart.get_cart(user.user_id()).await)
}

pub async fn add_to_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    payload: Result<Json<AddToCartRequest>, JsonRejection>,
) -> Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };
    let product_id: ProductId = match dto::parse_id(&body.product_id, "product") {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    dto::ok_json(
        services
            .cart
            .add_item(user.user_id(), product_id, body.quantity)
            .await,
    )
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(item_id): Path<String>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Response {
    let item_id: LineItemId = match dto::parse_id(&item_id, "item") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    dto::ok_json(
        services
            .cart
            .update_item_quantity(user.user_id(), item_id, body.quantity)
            .await,
    )
}

pub async fn remove_item(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(item_id): Path<String>,
) -> Response {
    let item_id: LineItemId = match dto::parse_id(&item_id, "item") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    dto::ok_json(services.cart.remove_item(user.user_id(), item_id).await)
}

pub async fn clear_cart(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> Response {
    dto::ok_json(services.cart.clear_cart(user.user_id()).await)
}
