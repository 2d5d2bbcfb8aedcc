//! The checkout boundary with the remote order service.
//!
//! The cart never eagerly syncs on mutation; availability of cart commands
//! must not depend on network availability. Reconciliation happens once, at
//! checkout, and the engine clears the store only on a confirmed order.

use std::future::Future;

use rust_decimal::Decimal;
use silk_road_core::{LineItem, Order, ProductId, ShippingInfo};
use thiserror::Error;

/// Ways an order submission can fail.
///
/// None of these clear or modify the cart; the caller surfaces them to the
/// user for resolution or retry.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The order service rejected the submission contents.
    #[error("order rejected: {0}")]
    Validation(String),

    /// A line's product no longer has sufficient stock. The failing line
    /// stays in the cart unmodified; the user must resolve it.
    #[error("insufficient stock for product {0}")]
    OutOfStock(ProductId),

    /// Transport-level failure. Retryable; the submission may not have
    /// reached the service.
    #[error("order service unreachable: {0}")]
    Network(String),
}

impl CheckoutError {
    /// Whether retrying the same submission can succeed without the user
    /// changing the cart.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Adapter to the remote order-taking service.
///
/// Implemented by the REST client; test doubles implement it in-process.
/// A submission has no cancellation contract: once issued it runs to
/// completion or failure, and timeouts are the implementation's concern.
pub trait RemoteSync {
    /// Submit the cart snapshot as an order.
    ///
    /// `total` is the engine-computed grand total (subtotal + shipping + tax)
    /// sent alongside the lines for server-side verification.
    fn submit_order(
        &self,
        lines: &[LineItem],
        shipping: &ShippingInfo,
        total: Decimal,
    ) -> impl Future<Output = Result<Order, CheckoutError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_errors_are_retryable() {
        assert!(CheckoutError::Network("timeout".into()).is_retryable());
        assert!(!CheckoutError::OutOfStock(ProductId::new(1)).is_retryable());
        assert!(!CheckoutError::Validation("bad address".into()).is_retryable());
    }
}
