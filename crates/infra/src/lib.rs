//! Infrastructure layer: stores, database wiring and the cart engine.

pub mod cart_engine;
pub mod cart_store;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod stores;
pub mod user_locks;

pub use cart_engine::CartEngine;
pub use cart_store::{CartStore, InMemoryCartStore, PostgresCartStore};
pub use catalog::{
    CatalogService, InMemoryCatalog, PostgresCatalog, ProductCatalog, ProductRepository,
};
pub use config::StoreConfig;
pub use error::{ServiceError, StoreError};
pub use stores::{Stores, build_stores};
