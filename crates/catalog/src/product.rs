use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, Entity, ProductId, UserId};

/// Reference to an externally stored product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub public_id: String,
    pub url: String,
}

/// Catalog product.
///
/// `price` is in the smallest currency unit (e.g. paise/cents). `stock` is
/// advisory: carts never reserve or decrement it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub category: String,
    pub image: ProductImage,
    pub stock: u64,
    pub active: bool,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: u64,
    pub category: String,
    pub image: ProductImage,
    #[serde(default)]
    pub stock: u64,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<u64>,
    pub category: Option<String>,
    pub image: Option<ProductImage>,
    pub stock: Option<u64>,
    pub active: Option<bool>,
}

/// Live display fields joined into cart views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    /// Current catalog price (display only; cart totals use the line snapshot).
    pub price: u64,
    pub image: ProductImage,
    pub category: String,
    pub stock: u64,
    pub active: bool,
}

impl Product {
    /// Validate input and build a new, active product.
    pub fn create(
        id: ProductId,
        created_by: UserId,
        input: NewProduct,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let product = Self {
            id,
            name: input.name.trim().to_string(),
            description: input.description.trim().to_string(),
            price: input.price,
            category: input.category.trim().to_string(),
            image: input.image,
            stock: input.stock,
            active: true,
            created_by,
            created_at: now,
            updated_at: now,
        };
        product.validate()?;
        Ok(product)
    }

    /// Apply a partial update. Leaves `self` untouched when validation fails.
    pub fn apply_update(&mut self, update: ProductUpdate, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut next = self.clone();
        if let Some(name) = update.name {
            next.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            next.description = description.trim().to_string();
        }
        if let Some(price) = update.price {
            next.price = price;
        }
        if let Some(category) = update.category {
            next.category = category.trim().to_string();
        }
        if let Some(image) = update.image {
            next.image = image;
        }
        if let Some(stock) = update.stock {
            next.stock = stock;
        }
        if let Some(active) = update.active {
            next.active = active;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Only active products can be put into a cart.
    pub fn can_be_sold(&self) -> bool {
        self.active
    }

    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
            category: self.category.clone(),
            stock: self.stock,
            active: self.active,
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.description.is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        if self.category.is_empty() {
            return Err(DomainError::validation("category cannot be empty"));
        }
        if self.image.url.trim().is_empty() {
            return Err(DomainError::validation("image url cannot be empty"));
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
