use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_catalog::{Product, ProductSummary};
use storefront_core::{ProductId, UserId};

use super::{ProductCatalog, ProductRepository};
use crate::error::StoreError;

/// In-memory product store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<ProductId, Product>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("catalog lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<ProductId, Product>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("catalog lock poisoned".to_string()))
    }

    fn sorted_newest_first(mut products: Vec<Product>) -> Vec<Product> {
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.as_uuid().cmp(a.id.as_uuid())));
        products
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_summaries(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, ProductSummary>, StoreError> {
        let map = self.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| map.get(id).map(|p| (*id, p.summary())))
            .collect())
    }
}

#[async_trait]
impl ProductRepository for InMemoryCatalog {
    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        let mut map = self.write()?;
        if map.contains_key(&product.id) {
            return Err(StoreError::Conflict(format!("product {} already exists", product.id)));
        }
        map.insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool, StoreError> {
        let mut map = self.write()?;
        match map.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(&id).is_some())
    }

    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.read()?.values().filter(|p| p.active).cloned().collect();
        Ok(Self::sorted_newest_first(products))
    }

    async fn list_by_creator(&self, owner: UserId) -> Result<Vec<Product>, StoreError> {
        let products = self
            .read()?
            .values()
            .filter(|p| p.created_by == owner)
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(products))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use storefront_catalog::{NewProduct, ProductImage};

    fn product(owner: UserId, name: &str, minutes_ago: i64) -> Product {
        Product::create(
            ProductId::new(),
            owner,
            NewProduct {
                name: name.to_string(),
                description: "desc".to_string(),
                price: 1_000,
                category: "misc".to_string(),
                image: ProductImage {
                    public_id: "img".to_string(),
                    url: "https://img.example/x.png".to_string(),
                },
                stock: 3,
            },
            Utc::now() - Duration::minutes(minutes_ago),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn active_listing_hides_inactive_and_orders_newest_first() {
        let store = InMemoryCatalog::new();
        let owner = UserId::new();
        let old = product(owner, "old", 10);
        let new = product(owner, "new", 1);
        let mut hidden = product(owner, "hidden", 5);
        hidden.active = false;
        for p in [&old, &new, &hidden] {
            store.insert(p).await.unwrap();
        }

        let names: Vec<_> = store
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["new", "old"]);

        assert_eq!(store.list_by_creator(owner).await.unwrap().len(), 3);
        assert!(store.find_active_product(hidden.id).await.unwrap().is_none());
        assert!(store.find_product(hidden.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn summaries_skip_missing_products() {
        let store = InMemoryCatalog::new();
        let p = product(UserId::new(), "mug", 0);
        store.insert(&p).await.unwrap();

        let found = store.find_summaries(&[p.id, ProductId::new()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[&p.id].name, "mug");
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = InMemoryCatalog::new();
        let p = product(UserId::new(), "mug", 0);
        assert!(!store.update(&p).await.unwrap());
        assert!(!store.delete(p.id).await.unwrap());

        store.insert(&p).await.unwrap();
        assert!(matches!(store.insert(&p).await, Err(StoreError::Conflict(_))));
        assert!(store.delete(p.id).await.unwrap());
    }
}
