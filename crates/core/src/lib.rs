//! Silk Road Core - Shared types library.
//!
//! This crate provides common types used across all Silk Road components:
//! - `cart` - Line-item store, cart engine, persistence
//! - `client` - REST client for the marketplace API
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, line items, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
