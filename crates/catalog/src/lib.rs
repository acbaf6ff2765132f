//! Product catalog domain module.
//!
//! Products are owned by the store owner and mutated independently of carts.
//! This crate holds the product model and its validation rules (no IO).

pub mod product;

pub use product::{NewProduct, Product, ProductImage, ProductSummary, ProductUpdate};
