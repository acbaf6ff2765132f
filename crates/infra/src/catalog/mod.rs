//! Product catalog stores.
//!
//! `ProductCatalog` is the read-only view the cart engine depends on;
//! `ProductRepository` adds the owner-side writes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use storefront_catalog::{Product, ProductSummary};
use storefront_core::{ProductId, UserId};

use crate::error::StoreError;

mod in_memory;
mod postgres;
pub mod seed;
mod service;

pub use in_memory::InMemoryCatalog;
pub use postgres::PostgresCatalog;
pub use service::CatalogService;

/// Read access to products, used when adding to and materializing carts.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Like `find_product`, but hides inactive products.
    async fn find_active_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.find_product(id).await?.filter(Product::can_be_sold))
    }

    /// Batch lookup; ids with no product are simply absent from the map.
    async fn find_summaries(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, ProductSummary>, StoreError>;
}

/// Owner-side product persistence.
#[async_trait]
pub trait ProductRepository: ProductCatalog {
    async fn insert(&self, product: &Product) -> Result<(), StoreError>;

    /// Returns `false` when no product with that id exists.
    async fn update(&self, product: &Product) -> Result<bool, StoreError>;

    /// Returns `false` when no product with that id exists.
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Active products, newest first.
    async fn list_active(&self) -> Result<Vec<Product>, StoreError>;

    /// All products created by `owner` (active or not), newest first.
    async fn list_by_creator(&self, owner: UserId) -> Result<Vec<Product>, StoreError>;
}

#[async_trait]
impl<S> ProductCatalog for Arc<S>
where
    S: ProductCatalog + ?Sized,
{
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_product(id).await
    }

    async fn find_active_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).find_active_product(id).await
    }

    async fn find_summaries(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, ProductSummary>, StoreError> {
        (**self).find_summaries(ids).await
    }
}

#[async_trait]
impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        (**self).insert(product).await
    }

    async fn update(&self, product: &Product) -> Result<bool, StoreError> {
        (**self).update(product).await
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        (**self).delete(id).await
    }

    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        (**self).list_active().await
    }

    async fn list_by_creator(&self, owner: UserId) -> Result<Vec<Product>, StoreError> {
        (**self).list_by_creator(owner).await
    }
}
