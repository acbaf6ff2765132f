//! Materialized cart view: stored lines joined with live catalog fields.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::ProductSummary;
use storefront_core::{LineItemId, ProductId};

use crate::cart::Cart;

/// One line of the materialized cart.
///
/// `product` is `None` when the referenced product no longer exists in the
/// catalog; the line itself is kept. `available` is false for deleted or
/// deactivated products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub id: LineItemId,
    pub product_id: ProductId,
    pub product: Option<ProductSummary>,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
    pub available: bool,
    pub added_at: DateTime<Utc>,
}

/// Cart representation returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total_items: u64,
    pub total_price: u64,
}

impl CartView {
    /// Shape returned for a user who has no cart yet (or an emptied one).
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_price: 0,
        }
    }

    /// Join the cart's lines with the given product summaries.
    ///
    /// Totals come from the cart's snapshot prices, never from `products`.
    pub fn materialize(cart: &Cart, products: &HashMap<ProductId, ProductSummary>) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|line| {
                let product = products.get(&line.product_id).cloned();
                let available = product.as_ref().is_some_and(|p| p.active);
                CartLineView {
                    id: line.id,
                    product_id: line.product_id,
                    product,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    line_total: line.line_total(),
                    available,
                    added_at: line.added_at,
                }
            })
            .collect();

        Self {
            items,
            total_items: cart.total_items(),
            total_price: cart.total_price(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
