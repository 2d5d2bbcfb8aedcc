//! Core types for Silk Road.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod line_item;
pub mod money;
pub mod order;
pub mod status;

pub use id::*;
pub use line_item::{LineItem, LineKey, Variant};
pub use money::{CurrencyCode, Money};
pub use order::{Order, ShippingInfo};
pub use status::OrderStatus;
