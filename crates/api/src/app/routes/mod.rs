use axum::{routing::get, Router};

pub mod cart;
pub mod owner;
pub mod products;
pub mod system;

/// Endpoints that need no token.
pub fn public_router() -> Router {
    Router::new().nest("/products", products::router())
}

/// Endpoints that require an authenticated caller.
pub fn protected_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/cart", cart::router())
        .nest("/owner/products", owner::router())
}
