//! Postgres-backed cart store.
//!
//! A cart is one `carts` row plus its `cart_items` rows. `save` rewrites the
//! item rows inside a transaction after checking `carts.version`:
//!
//! - `Exact(0)`: insert the header; an existing row is a conflict.
//! - `Exact(v)`: update the header only where `version = v`.
//! - `Any`: upsert the header.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;
use uuid::Uuid;

use storefront_cart::{Cart, CartSnapshot, LineItem};
use storefront_core::{ExpectedVersion, LineItemId, ProductId, UserId};

use super::{CartStore, version_conflict};
use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

impl PostgresCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
struct CartRow {
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug)]
struct CartItemRow {
    id: Uuid,
    product_id: Uuid,
    quantity: i64,
    unit_price: i64,
    added_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for CartRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CartRow {
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl<'r> sqlx::FromRow<'r, PgRow> for CartItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CartItemRow {
            id: row.try_get("id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            added_at: row.try_get("added_at")?,
        })
    }
}

impl TryFrom<CartItemRow> for LineItem {
    type Error = StoreError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        Ok(LineItem {
            id: LineItemId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            quantity: u32::try_from(row.quantity)
                .map_err(|_| StoreError::Corrupt(format!("bad quantity: {}", row.quantity)))?,
            unit_price: u64::try_from(row.unit_price)
                .map_err(|_| StoreError::Corrupt(format!("bad unit_price: {}", row.unit_price)))?,
            added_at: row.added_at,
        })
    }
}

fn to_i64(column: &str, value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Invalid(format!("{column} out of range: {value}")))
}

#[async_trait]
impl CartStore for PostgresCartStore {
    #[instrument(skip(self), fields(user_id = %owner), err)]
    async fn load(&self, owner: UserId) -> Result<Option<Cart>, StoreError> {
        let header = sqlx::query_as::<_, CartRow>(
            "SELECT version, created_at, updated_at FROM carts WHERE user_id = $1",
        )
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT id, product_id, quantity, unit_price, added_at
              FROM cart_items
             WHERE user_id = $1
             ORDER BY position ASC
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let version = u64::try_from(header.version)
            .map_err(|_| StoreError::Corrupt(format!("bad cart version: {}", header.version)))?;

        Ok(Some(Cart::restore(CartSnapshot {
            owner,
            items,
            version,
            created_at: header.created_at,
            updated_at: header.updated_at,
        })))
    }

    #[instrument(skip(self, cart), fields(user_id = %cart.owner(), expected = ?expected), err)]
    async fn save(&self, cart: &Cart, expected: ExpectedVersion) -> Result<(), StoreError> {
        let snapshot = cart
            .snapshot()
            .ok_or_else(|| StoreError::Invalid("cannot persist a cart that was never created".to_string()))?;
        let owner = snapshot.owner;
        let version = to_i64("version", snapshot.version)?;

        let mut tx = self.pool.begin().await?;

        let header_written = match expected {
            ExpectedVersion::Exact(0) => {
                sqlx::query(
                    r#"
                    INSERT INTO carts (user_id, version, created_at, updated_at)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (user_id) DO NOTHING
                    "#,
                )
                .bind(owner.as_uuid())
                .bind(version)
                .bind(snapshot.created_at)
                .bind(snapshot.updated_at)
                .execute(&mut *tx)
                .await?
                .rows_affected()
            }
            ExpectedVersion::Exact(previous) => {
                sqlx::query(
                    "UPDATE carts SET version = $2, updated_at = $3 WHERE user_id = $1 AND version = $4",
                )
                .bind(owner.as_uuid())
                .bind(version)
                .bind(snapshot.updated_at)
                .bind(to_i64("version", previous)?)
                .execute(&mut *tx)
                .await?
                .rows_affected()
            }
            ExpectedVersion::Any => {
                sqlx::query(
                    r#"
                    INSERT INTO carts (user_id, version, created_at, updated_at)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (user_id) DO UPDATE
                       SET version = EXCLUDED.version, updated_at = EXCLUDED.updated_at
                    "#,
                )
                .bind(owner.as_uuid())
                .bind(version)
                .bind(snapshot.created_at)
                .bind(snapshot.updated_at)
                .execute(&mut *tx)
                .await?
                .rows_affected()
            }
        };

        if header_written == 0 {
            let actual: Option<i64> =
                sqlx::query_scalar("SELECT version FROM carts WHERE user_id = $1")
                    .bind(owner.as_uuid())
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;
            let actual = actual.and_then(|v| u64::try_from(v).ok()).unwrap_or(0);
            return Err(version_conflict(owner, expected, actual));
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(owner.as_uuid())
            .execute(&mut *tx)
            .await?;

        for (position, item) in snapshot.items.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::Invalid("too many cart lines".to_string()))?;
            sqlx::query(
                r#"
                INSERT INTO cart_items (id, user_id, product_id, quantity, unit_price, position, added_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(owner.as_uuid())
            .bind(item.product_id.as_uuid())
            .bind(i64::from(item.quantity))
            .bind(to_i64("unit_price", item.unit_price)?)
            .bind(position)
            .bind(item.added_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
