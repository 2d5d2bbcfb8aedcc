//! Silk Road Cart - Headless shopping-cart engine.
//!
//! The cart is modelled as three pieces with explicit seams:
//!
//! - [`LineItemStore`] - the canonical insertion-ordered set of cart lines,
//!   keyed by `(product, variant)`.
//! - [`CartEngine`] - the command surface (add/remove/update/clear/checkout)
//!   that enforces invariants and computes totals. One engine per user session;
//!   exactly one writer.
//! - Adapters: [`PersistenceAdapter`] snapshots lines to a durable key-value
//!   surface so a cart survives restarts; [`RemoteSync`] reconciles the cart
//!   with the remote order service at the checkout boundary only.
//!
//! Mutating commands are synchronous and atomic; persistence saves run in the
//! background and a save failure never blocks the in-memory operation (the
//! cart stays usable offline). The cart is cleared only when the order
//! service confirms the order.
//!
//! # Example
//!
//! ```rust,ignore
//! use silk_road_cart::{CartEngine, JsonFileStore, ProductInfo};
//! use silk_road_core::Variant;
//!
//! let mut cart = CartEngine::load(JsonFileStore::new("cart.json")).await;
//! cart.add_to_cart(&scarf, 2, Variant::new("M"))?;
//! let totals = cart.totals();
//! let order = cart.checkout(&client, shipping).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod engine;
mod error;
mod persistence;
mod store;
mod sync;

pub use engine::{CartEngine, CartState, CartSummary, CartTotals, ProductInfo};
pub use error::CartError;
pub use persistence::{JsonFileStore, MemoryStore, PersistenceAdapter, StorageError};
pub use store::LineItemStore;
pub use sync::{CheckoutError, RemoteSync};
