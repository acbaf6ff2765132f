use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_cart::{Cart, CartSnapshot};
use storefront_core::{AggregateRoot, ExpectedVersion, UserId};

use super::{CartStore, version_conflict};
use crate::error::StoreError;

/// In-memory cart store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    inner: RwLock<HashMap<UserId, CartSnapshot>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn load(&self, owner: UserId) -> Result<Option<Cart>, StoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StoreError::Unavailable("cart store lock poisoned".to_string()))?;
        Ok(map.get(&owner).cloned().map(Cart::restore))
    }

    async fn save(&self, cart: &Cart, expected: ExpectedVersion) -> Result<(), StoreError> {
        let snapshot = cart
            .snapshot()
            .ok_or_else(|| StoreError::Invalid("cannot persist a cart that was never created".to_string()))?;

        let mut map = self
            .inner
            .write()
            .map_err(|_| StoreError::Unavailable("cart store lock poisoned".to_string()))?;

        let current = map.get(&snapshot.owner).map(|s| s.version).unwrap_or(0);
        if !expected.matches(current) {
            return Err(version_conflict(*cart.id(), expected, current));
        }

        map.insert(snapshot.owner, snapshot);
        Ok(())
    }
}
