//! Postgres-backed product store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;
use uuid::Uuid;

use storefront_catalog::{Product, ProductImage, ProductSummary};
use storefront_core::{ProductId, UserId};

use super::{ProductCatalog, ProductRepository};
use crate::error::StoreError;

const PRODUCT_COLUMNS: &str = "id, name, description, price, category, image_public_id, image_url, \
     stock, active, created_by, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: i64,
    category: String,
    image_public_id: String,
    image_url: String,
    stock: i64,
    active: bool,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            image_public_id: row.try_get("image_public_id")?,
            image_url: row.try_get("image_url")?,
            stock: row.try_get("stock")?,
            active: row.try_get("active")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            price: to_u64("price", row.price)?,
            category: row.category,
            image: ProductImage {
                public_id: row.image_public_id,
                url: row.image_url,
            },
            stock: to_u64("stock", row.stock)?,
            active: row.active,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn to_u64(column: &str, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("negative {column}: {value}")))
}

fn to_i64(column: &str, value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Invalid(format!("{column} out of range: {value}")))
}

fn into_products(rows: Vec<ProductRow>) -> Result<Vec<Product>, StoreError> {
    rows.into_iter().map(Product::try_from).collect()
}

#[async_trait]
impl ProductCatalog for PostgresCatalog {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn find_summaries(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, ProductSummary>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(&uuids)
        .fetch_all(&self.pool)
        .await?;

        Ok(into_products(rows)?
            .into_iter()
            .map(|p| (p.id, p.summary()))
            .collect())
    }
}

#[async_trait]
impl ProductRepository for PostgresCatalog {
    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO products
                (id, name, description, price, category, image_public_id, image_url,
                 stock, active, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(to_i64("price", product.price)?)
        .bind(&product.category)
        .bind(&product.image.public_id)
        .bind(&product.image.url)
        .bind(to_i64("stock", product.stock)?)
        .bind(product.active)
        .bind(product.created_by.as_uuid())
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => Err(
                StoreError::Conflict(format!("product {} already exists", product.id)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn update(&self, product: &Product) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
               SET name = $2, description = $3, price = $4, category = $5,
                   image_public_id = $6, image_url = $7, stock = $8, active = $9,
                   updated_at = $10
             WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(to_i64("price", product.price)?)
        .bind(&product.category)
        .bind(&product.image.public_id)
        .bind(&product.image.url)
        .bind(to_i64("stock", product.stock)?)
        .bind(product.active)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE active ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        into_products(rows)
    }

    async fn list_by_creator(&self, owner: UserId) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE created_by = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        into_products(rows)
    }
}
