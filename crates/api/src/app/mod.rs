//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store backends, cart engine, catalog service
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use storefront_auth::{Hs256JwtValidator, JwtValidator};
use storefront_infra::StoreError;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, StoreError> {
    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.clone().into_bytes()));
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(services, jwt))
}

/// Assemble routes around already-built services.
pub fn router(services: Arc<services::AppServices>, jwt: Arc<dyn JwtValidator>) -> Router {
    let auth_state = middleware::AuthState { jwt };

    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    let api = routes::public_router().merge(protected);

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", api)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
