use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};

use storefront_catalog::{NewProduct, Product, ProductUpdate};
use storefront_core::{ProductId, UserId};

use super::ProductRepository;
use crate::error::ServiceError;

/// Product operations exposed to the API: public browsing and owner CRUD.
///
/// Role checks happen at the HTTP layer; this type assumes the caller for the
/// write operations is already known to be a store owner.
#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn ProductRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_active(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.repo.list_active().await?)
    }

    /// Public lookup; inactive products are reported as missing.
    pub async fn get_active(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.repo
            .find_active_product(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product not found"))
    }

    pub async fn list_mine(&self, owner: UserId) -> Result<Vec<Product>, ServiceError> {
        Ok(self.repo.list_by_creator(owner).await?)
    }

    #[instrument(skip(self, owner, input), fields(owner = %owner))]
    pub async fn create(&self, owner: UserId, input: NewProduct) -> Result<Product, ServiceError> {
        let product = Product::create(ProductId::new(), owner, input, Utc::now())?;
        self.repo.insert(&product).await?;
        info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[instrument(skip(self, update), fields(product_id = %id))]
    pub async fn update(&self, id: ProductId, update: ProductUpdate) -> Result<Product, ServiceError> {
        let mut product = self
            .repo
            .find_product(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product not found"))?;
        product.apply_update(update, Utc::now())?;

        if !self.repo.update(&product).await? {
            return Err(ServiceError::not_found("product not found"));
        }
        info!("product updated");
        Ok(product)
    }

    /// Hard delete. Cart lines that reference the product are left in place.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), ServiceError> {
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("product not found"));
        }
        info!("product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use storefront_catalog::ProductImage;

    fn input(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: "stoneware".to_string(),
            price: 2_500,
            category: "kitchen".to_string(),
            image: ProductImage {
                public_id: "mug".to_string(),
                url: "https://img.example/mug.png".to_string(),
            },
            stock: 10,
        }
    }

    #[tokio::test]
    async fn deactivated_products_disappear_from_public_reads() {
        let service = CatalogService::new(Arc::new(InMemoryCatalog::new()));
        let owner = UserId::new();
        let product = service.create(owner, input("Mug")).await.unwrap();

        service
            .update(
                product.id,
                ProductUpdate {
                    active: Some(false),
                    ..ProductUpdate::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            service.get_active(product.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(service.list_active().await.unwrap().is_empty());
        assert_eq!(service.list_mine(owner).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let service = CatalogService::new(Arc::new(InMemoryCatalog::new()));
        let err = service.create(UserId::new(), input("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn missing_products_are_not_found() {
        let service = CatalogService::new(Arc::new(InMemoryCatalog::new()));
        assert!(matches!(
            service.delete(ProductId::new()).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.update(ProductId::new(), ProductUpdate::default()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
