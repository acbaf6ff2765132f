use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{
    Aggregate, AggregateRoot, DomainError, Entity, Event, LineItemId, ProductId, UserId,
};

/// Cart line: product reference, quantity, snapshot unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    /// Weak reference: the product may later be re-priced, deactivated or deleted.
    pub product_id: ProductId,
    /// Always >= 1.
    pub quantity: u32,
    /// Catalog price at the moment the line was created (smallest currency unit).
    pub unit_price: u64,
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    pub fn line_total(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

impl Entity for LineItem {
    type Id = LineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Persisted form of a cart, used by stores to save and rehydrate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub owner: UserId,
    pub items: Vec<LineItem>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregate root: Cart (exactly one per user, identified by its owner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    owner: UserId,
    items: Vec<LineItem>,
    version: u64,
    created: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// Create an empty, not-yet-persisted cart for `owner`.
    pub fn empty(owner: UserId) -> Self {
        Self {
            owner,
            items: Vec::new(),
            version: 0,
            created: false,
            created_at: None,
            updated_at: None,
        }
    }

    /// Rehydrate a stored cart.
    pub fn restore(snapshot: CartSnapshot) -> Self {
        Self {
            owner: snapshot.owner,
            items: snapshot.items,
            version: snapshot.version,
            created: true,
            created_at: Some(snapshot.created_at),
            updated_at: Some(snapshot.updated_at),
        }
    }

    /// Persisted form; `None` while the cart has never been created.
    pub fn snapshot(&self) -> Option<CartSnapshot> {
        if !self.created {
            return None;
        }
        let created_at = self.created_at?;
        Some(CartSnapshot {
            owner: self.owner,
            items: self.items.clone(),
            version: self.version,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn item(&self, item_id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn item_for_product(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// Sum of quantities over all lines.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of `unit_price × quantity` over all lines (snapshot prices only).
    pub fn total_price(&self) -> u64 {
        self.items.iter().map(LineItem::line_total).sum()
    }
}

impl AggregateRoot for Cart {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.owner
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddItem (accumulates into an existing line for the same product).
///
/// `unit_price` is the catalog price read by the caller at add time; it is
/// only used when a new line is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub owner: UserId,
    pub item_id: LineItemId,
    pub product_id: ProductId,
    pub unit_price: u64,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateItemQuantity (absolute set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItemQuantity {
    pub owner: UserId,
    pub item_id: LineItemId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub owner: UserId,
    pub item_id: LineItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub owner: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartCommand {
    AddItem(AddItem),
    UpdateItemQuantity(UpdateItemQuantity),
    RemoveItem(RemoveItem),
    ClearCart(ClearCart),
}

/// Event: CartCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCreated {
    pub owner: UserId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemAdded (new line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub owner: UserId,
    pub item_id: LineItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemQuantityIncreased (merge into an existing line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuantityIncreased {
    pub owner: UserId,
    pub item_id: LineItemId,
    pub added: u32,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemQuantitySet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuantitySet {
    pub owner: UserId,
    pub item_id: LineItemId,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub owner: UserId,
    pub item_id: LineItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    pub owner: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartEvent {
    CartCreated(CartCreated),
    ItemAdded(ItemAdded),
    ItemQuantityIncreased(ItemQuantityIncreased),
    ItemQuantitySet(ItemQuantitySet),
    ItemRemoved(ItemRemoved),
    CartCleared(CartCleared),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::CartCreated(_) => "cart.created",
            CartEvent::ItemAdded(_) => "cart.item.added",
            CartEvent::ItemQuantityIncreased(_) => "cart.item.quantity_increased",
            CartEvent::ItemQuantitySet(_) => "cart.item.quantity_set",
            CartEvent::ItemRemoved(_) => "cart.item.removed",
            CartEvent::CartCleared(_) => "cart.cleared",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::CartCreated(e) => e.occurred_at,
            CartEvent::ItemAdded(e) => e.occurred_at,
            CartEvent::ItemQuantityIncreased(e) => e.occurred_at,
            CartEvent::ItemQuantitySet(e) => e.occurred_at,
            CartEvent::ItemRemoved(e) => e.occurred_at,
            CartEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::CartCreated(e) => {
                self.owner = e.owner;
                self.items.clear();
                self.created = true;
                self.created_at = Some(e.occurred_at);
            }
            CartEvent::ItemAdded(e) => {
                self.items.push(LineItem {
                    id: e.item_id,
                    product_id: e.product_id,
                    quantity: e.quantity,
                    unit_price: e.unit_price,
                    added_at: e.occurred_at,
                });
            }
            CartEvent::ItemQuantityIncreased(e) => {
                if let Some(line) = self.items.iter_mut().find(|i| i.id == e.item_id) {
                    line.quantity = e.quantity;
                }
            }
            CartEvent::ItemQuantitySet(e) => {
                if let Some(line) = self.items.iter_mut().find(|i| i.id == e.item_id) {
                    line.quantity = e.quantity;
                }
            }
            CartEvent::ItemRemoved(e) => {
                self.items.retain(|i| i.id != e.item_id);
            }
            CartEvent::CartCleared(_) => {
                self.items.clear();
            }
        }

        self.updated_at = Some(event.occurred_at());
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem(cmd) => self.handle_add_item(cmd),
            CartCommand::UpdateItemQuantity(cmd) => self.handle_update_quantity(cmd),
            CartCommand::RemoveItem(cmd) => self.handle_remove_item(cmd),
            CartCommand::ClearCart(cmd) => self.handle_clear(cmd),
        }
    }
}

/// Convert a requested quantity into a stored one (always >= 1).
fn line_quantity(requested: i64) -> Result<u32, DomainError> {
    if requested < 1 {
        return Err(DomainError::validation("quantity must be a positive integer"));
    }
    u32::try_from(requested).map_err(|_| DomainError::validation("quantity is too large"))
}

/// Checked `Σ unit_price × quantity`; `None` on overflow.
fn checked_total(lines: impl Iterator<Item = (u64, u32)>) -> Option<u64> {
    lines.fold(Some(0u64), |acc, (price, qty)| {
        acc?.checked_add(price.checked_mul(u64::from(qty))?)
    })
}

impl Cart {
    fn ensure_owner(&self, owner: UserId) -> Result<(), DomainError> {
        if self.owner != owner {
            return Err(DomainError::Unauthorized);
        }
        Ok(())
    }

    /// Reject mutations whose resulting total would not be representable.
    fn ensure_total_fits(lines: impl Iterator<Item = (u64, u32)>) -> Result<(), DomainError> {
        checked_total(lines)
            .map(|_| ())
            .ok_or_else(|| DomainError::validation("cart total is too large"))
    }

    fn handle_add_item(&self, cmd: &AddItem) -> Result<Vec<CartEvent>, DomainError> {
        self.ensure_owner(cmd.owner)?;
        let quantity = line_quantity(cmd.quantity)?;

        let mut events = Vec::with_capacity(2);
        if !self.created {
            events.push(CartEvent::CartCreated(CartCreated {
                owner: cmd.owner,
                occurred_at: cmd.occurred_at,
            }));
        }

        match self.item_for_product(cmd.product_id) {
            Some(existing) => {
                let merged = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| DomainError::validation("quantity is too large"))?;
                Self::ensure_total_fits(self.items.iter().map(|i| {
                    let qty = if i.id == existing.id { merged } else { i.quantity };
                    (i.unit_price, qty)
                }))?;

                events.push(CartEvent::ItemQuantityIncreased(ItemQuantityIncreased {
                    owner: cmd.owner,
                    item_id: existing.id,
                    added: quantity,
                    quantity: merged,
                    occurred_at: cmd.occurred_at,
                }));
            }
            None => {
                if self.item(cmd.item_id).is_some() {
                    return Err(DomainError::conflict("line item id already in use"));
                }
                Self::ensure_total_fits(
                    self.items
                        .iter()
                        .map(|i| (i.unit_price, i.quantity))
                        .chain(core::iter::once((cmd.unit_price, quantity))),
                )?;

                events.push(CartEvent::ItemAdded(ItemAdded {
                    owner: cmd.owner,
                    item_id: cmd.item_id,
                    product_id: cmd.product_id,
                    quantity,
                    unit_price: cmd.unit_price,
                    occurred_at: cmd.occurred_at,
                }));
            }
        }

        Ok(events)
    }

    fn handle_update_quantity(
        &self,
        cmd: &UpdateItemQuantity,
    ) -> Result<Vec<CartEvent>, DomainError> {
        self.ensure_owner(cmd.owner)?;
        let quantity = line_quantity(cmd.quantity)?;

        let line = self
            .item(cmd.item_id)
            .ok_or_else(|| DomainError::not_found("cart item not found"))?;

        Self::ensure_total_fits(self.items.iter().map(|i| {
            let qty = if i.id == line.id { quantity } else { i.quantity };
            (i.unit_price, qty)
        }))?;

        Ok(vec![CartEvent::ItemQuantitySet(ItemQuantitySet {
            owner: cmd.owner,
            item_id: cmd.item_id,
            quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_item(&self, cmd: &RemoveItem) -> Result<Vec<CartEvent>, DomainError> {
        self.ensure_owner(cmd.owner)?;

        if self.item(cmd.item_id).is_none() {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::ItemRemoved(ItemRemoved {
            owner: cmd.owner,
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear(&self, cmd: &ClearCart) -> Result<Vec<CartEvent>, DomainError> {
        self.ensure_owner(cmd.owner)?;

        if self.items.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::CartCleared(CartCleared {
            owner: cmd.owner,
            occurred_at: cmd.occurred_at,
        })])
    }
}
