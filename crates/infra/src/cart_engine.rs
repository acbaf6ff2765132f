//! Cart command pipeline.
//!
//! ```text
//! request
//!   ↓
//! 1. (add only) read the live product from the catalog
//!   ↓
//! 2. lock the user's cart, load it (or start empty)
//!   ↓
//! 3. handle + apply the command on the aggregate
//!   ↓
//! 4. join lines with live catalog fields
//!   ↓
//! 5. save with the pre-command version (compare-and-swap), if anything changed
//!   ↓
//! 6. unlock, return the view
//! ```
//!
//! Nothing is saved unless every step before it succeeded. A cart that was
//! never created is reported as the empty view and is only persisted once a
//! command actually changes it.

use chrono::Utc;
use tracing::{debug, info, instrument};

use storefront_cart::{
    AddItem, Cart, CartCommand, CartView, ClearCart, RemoveItem, UpdateItemQuantity,
};
use storefront_core::{Aggregate, AggregateRoot, Event, ExpectedVersion, LineItemId, ProductId, UserId};

use crate::cart_store::CartStore;
use crate::catalog::ProductCatalog;
use crate::error::ServiceError;
use crate::user_locks::UserLocks;

/// Default quantity for an add request that omits it.
pub const DEFAULT_ADD_QUANTITY: i64 = 1;

pub struct CartEngine<C, S> {
    catalog: C,
    store: S,
    locks: UserLocks,
}

impl<C, S> CartEngine<C, S>
where
    C: ProductCatalog,
    S: CartStore,
{
    pub fn new(catalog: C, store: S) -> Self {
        Self {
            catalog,
            store,
            locks: UserLocks::new(),
        }
    }

    #[instrument(skip(self, user), fields(user_id = %user))]
    pub async fn get_cart(&self, user: UserId) -> Result<CartView, ServiceError> {
        match self.store.load(user).await? {
            Some(cart) => self.materialize(&cart).await,
            None => Ok(CartView::empty()),
        }
    }

    /// Add `quantity` (default 1) of an active product; merges into an
    /// existing line for the same product. A new line pins the current price.
    #[instrument(skip(self, user, product_id), fields(user_id = %user, product_id = %product_id))]
    pub async fn add_item(
        &self,
        user: UserId,
        product_id: ProductId,
        quantity: Option<i64>,
    ) -> Result<CartView, ServiceError> {
        let quantity = quantity.unwrap_or(DEFAULT_ADD_QUANTITY);
        if quantity < 1 {
            return Err(ServiceError::invalid_input("quantity must be a positive integer"));
        }

        let product = self
            .catalog
            .find_active_product(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product not found or unavailable"))?;

        let command = CartCommand::AddItem(AddItem {
            owner: user,
            item_id: LineItemId::new(),
            product_id,
            unit_price: product.price,
            quantity,
            occurred_at: Utc::now(),
        });
        self.execute(user, command).await
    }

    /// Set a line's quantity (absolute, must be >= 1).
    #[instrument(skip(self, user, item_id), fields(user_id = %user, item_id = %item_id))]
    pub async fn update_item_quantity(
        &self,
        user: UserId,
        item_id: LineItemId,
        quantity: i64,
    ) -> Result<CartView, ServiceError> {
        let command = CartCommand::UpdateItemQuantity(UpdateItemQuantity {
            owner: user,
            item_id,
            quantity,
            occurred_at: Utc::now(),
        });
        self.execute(user, command).await
    }

    /// Remove a line. Unknown ids are ignored.
    #[instrument(skip(self, user, item_id), fields(user_id = %user, item_id = %item_id))]
    pub async fn remove_item(&self, user: UserId, item_id: LineItemId) -> Result<CartView, ServiceError> {
        let command = CartCommand::RemoveItem(RemoveItem {
            owner: user,
            item_id,
            occurred_at: Utc::now(),
        });
        self.execute(user, command).await
    }

    #[instrument(skip(self, user), fields(user_id = %user))]
    pub async fn clear_cart(&self, user: UserId) -> Result<CartView, ServiceError> {
        let command = CartCommand::ClearCart(ClearCart {
            owner: user,
            occurred_at: Utc::now(),
        });
        self.execute(user, command).await
    }

    async fn execute(&self, user: UserId, command: CartCommand) -> Result<CartView, ServiceError> {
        let _guard = self.locks.lock(user).await;

        let mut cart = self
            .store
            .load(user)
            .await?
            .unwrap_or_else(|| Cart::empty(user));
        let expected = ExpectedVersion::Exact(cart.version());

        let events = cart.execute(&command)?;
        let view = self.materialize(&cart).await?;

        if events.is_empty() {
            debug!("command was a no-op");
        } else {
            self.store.save(&cart, expected).await?;
            for event in &events {
                debug!(event_type = event.event_type(), version = cart.version(), "cart event applied");
            }
            info!(events = events.len(), version = cart.version(), "cart saved");
        }
        Ok(view)
    }

    async fn materialize(&self, cart: &Cart) -> Result<CartView, ServiceError> {
        if cart.items().is_empty() {
            return Ok(CartView::empty());
        }
        let ids: Vec<ProductId> = cart.items().iter().map(|line| line.product_id).collect();
        let products = self.catalog.find_summaries(&ids).await?;
        Ok(CartView::materialize(cart, &products))
    }
}
