//! Cart command errors.

use silk_road_core::ProductId;
use thiserror::Error;

use crate::sync::CheckoutError;

/// Errors returned by [`crate::CartEngine`] commands.
///
/// A failed command never partially applies; the store is left unchanged.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantity on an add must be at least 1.
    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    /// The product reference is not a valid server-assigned ID.
    #[error("invalid product id: {0}")]
    InvalidKey(ProductId),

    /// Unit prices cannot be negative.
    #[error("unit price cannot be negative")]
    InvalidPrice,

    /// Checkout requires at least one line.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The remote order service rejected or failed the submission.
    /// The cart is left untouched.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}
