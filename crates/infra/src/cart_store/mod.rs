//! Cart persistence.
//!
//! Stores hold one cart per user and save whole snapshots guarded by a
//! version check (compare-and-swap).

use std::sync::Arc;

use async_trait::async_trait;

use storefront_cart::Cart;
use storefront_core::{ExpectedVersion, UserId};

use crate::error::StoreError;

mod in_memory;
mod postgres;

pub use in_memory::InMemoryCartStore;
pub use postgres::PostgresCartStore;

#[async_trait]
pub trait CartStore: Send + Sync {
    /// Load the user's cart, or `None` if it was never created.
    async fn load(&self, owner: UserId) -> Result<Option<Cart>, StoreError>;

    /// Persist `cart` if the stored version matches `expected`
    /// (`Exact(0)` = no stored cart yet).
    ///
    /// Fails with `StoreError::Conflict` on a version mismatch.
    async fn save(&self, cart: &Cart, expected: ExpectedVersion) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> CartStore for Arc<S>
where
    S: CartStore + ?Sized,
{
    async fn load(&self, owner: UserId) -> Result<Option<Cart>, StoreError> {
        (**self).load(owner).await
    }

    async fn save(&self, cart: &Cart, expected: ExpectedVersion) -> Result<(), StoreError> {
        (**self).save(cart, expected).await
    }
}

fn version_conflict(owner: UserId, expected: ExpectedVersion, actual: u64) -> StoreError {
    StoreError::Conflict(format!(
        "cart for user {owner} changed concurrently (expected: {expected:?}, actual: {actual})"
    ))
}
