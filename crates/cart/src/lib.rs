//! Shopping cart domain module.
//!
//! This crate contains the per-user cart aggregate (merge, quantity and
//! pricing rules) and the materialized view joined with live catalog data,
//! implemented as deterministic domain logic (no IO, no HTTP, no storage).

pub mod cart;
pub mod view;

pub use cart::{
    AddItem, Cart, CartCleared, CartCommand, CartCreated, CartEvent, CartSnapshot, ClearCart,
    ItemAdded, ItemQuantityIncreased, ItemQuantitySet, ItemRemoved, LineItem, RemoveItem,
    UpdateItemQuantity,
};
pub use view::{CartLineView, CartView};
