//! Service wiring: store backends, cart engine, catalog service.

use std::sync::Arc;

use tracing::{info, warn};

use storefront_core::UserId;
use storefront_infra::catalog::seed::seed_demo_catalog;
use storefront_infra::{
    CartEngine, CartStore, CatalogService, ProductRepository, StoreError, Stores, build_stores,
};

use crate::config::AppConfig;

pub type CartService = CartEngine<Arc<dyn ProductRepository>, Arc<dyn CartStore>>;

pub struct AppServices {
    pub cart: CartService,
    pub catalog: CatalogService,
}

impl AppServices {
    pub fn from_stores(stores: Stores) -> Self {
        Self {
            cart: CartEngine::new(stores.products.clone(), stores.carts),
            catalog: CatalogService::new(stores.products),
        }
    }
}

pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    let stores = build_stores(&config.store).await?;

    if config.seed_catalog {
        if config.store.is_persistent() {
            warn!("SEED_CATALOG is ignored when DATABASE_URL is set");
        } else {
            let owner = config.seed_owner.unwrap_or_default();
            seed_demo_catalog(stores.products.as_ref(), owner).await?;
            info!(owner = %owner, "demo catalog seeded");
        }
    }

    Ok(AppServices::from_stores(stores))
}
