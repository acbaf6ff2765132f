//! Backend selection: in-memory for dev/tests, Postgres when configured.

use std::sync::Arc;

use crate::cart_store::{CartStore, InMemoryCartStore, PostgresCartStore};
use crate::catalog::{InMemoryCatalog, PostgresCatalog, ProductRepository};
use crate::config::StoreConfig;
use crate::db;
use crate::error::StoreError;

#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn ProductRepository>,
    pub carts: Arc<dyn CartStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(InMemoryCatalog::new()),
            carts: Arc::new(InMemoryCartStore::new()),
        }
    }
}

pub async fn build_stores(config: &StoreConfig) -> Result<Stores, StoreError> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
        return Ok(Stores::in_memory());
    };

    let pool = db::connect(url, config.max_connections).await?;
    db::apply_schema(&pool).await?;

    Ok(Stores {
        products: Arc::new(PostgresCatalog::new(pool.clone())),
        carts: Arc::new(PostgresCartStore::new(pool)),
    })
}
