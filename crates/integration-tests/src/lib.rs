//! Shared helpers for Silk Road integration tests.
//!
//! The test doubles here implement the cart's [`RemoteSync`] boundary
//! in-process so checkout behavior can be exercised without a network.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use rust_decimal::Decimal;
use silk_road_cart::{CheckoutError, ProductInfo, RemoteSync};
use silk_road_core::{LineItem, Order, OrderId, OrderStatus, ProductId, ShippingInfo, Variant};

/// A product for seeding carts in tests.
#[must_use]
pub fn product(id: i64, price_cents: i64) -> ProductInfo {
    ProductInfo {
        id: ProductId::new(id),
        name: format!("product-{id}"),
        unit_price: Decimal::new(price_cents, 2),
    }
}

/// A filled-in shipping form.
#[must_use]
pub fn shipping() -> ShippingInfo {
    ShippingInfo {
        first_name: "Marco".into(),
        last_name: "Polo".into(),
        email: "marco@example.com".into(),
        address: "1 Silk Road".into(),
        city: "Venice".into(),
        zip_code: "30100".into(),
    }
}

/// An order-service double that confirms every submission.
#[derive(Default)]
pub struct ConfirmingSync {
    submissions: AtomicU32,
}

impl ConfirmingSync {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many submissions this double has confirmed.
    #[must_use]
    pub fn submissions(&self) -> u32 {
        self.submissions.load(Ordering::SeqCst)
    }
}

impl RemoteSync for ConfirmingSync {
    fn submit_order(
        &self,
        lines: &[LineItem],
        shipping: &ShippingInfo,
        total: Decimal,
    ) -> impl Future<Output = Result<Order, CheckoutError>> + Send {
        let n = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        let order = Order {
            id: OrderId::new(i64::from(n)),
            items: lines.to_vec(),
            total,
            shipping_info: shipping.clone(),
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        };
        async move { Ok(order) }
    }
}

/// An order-service double that rejects every submission.
pub struct RejectingSync {
    kind: RejectKind,
}

enum RejectKind {
    OutOfStock(ProductId),
    Network,
    Validation,
}

impl RejectingSync {
    /// Reject with insufficient stock for `product_id`.
    #[must_use]
    pub const fn out_of_stock(product_id: ProductId) -> Self {
        Self {
            kind: RejectKind::OutOfStock(product_id),
        }
    }

    /// Reject with a transport failure.
    #[must_use]
    pub const fn network() -> Self {
        Self {
            kind: RejectKind::Network,
        }
    }

    /// Reject with a validation failure.
    #[must_use]
    pub const fn validation() -> Self {
        Self {
            kind: RejectKind::Validation,
        }
    }
}

impl RemoteSync for RejectingSync {
    fn submit_order(
        &self,
        _lines: &[LineItem],
        _shipping: &ShippingInfo,
        _total: Decimal,
    ) -> impl Future<Output = Result<Order, CheckoutError>> + Send {
        let err = match self.kind {
            RejectKind::OutOfStock(product_id) => CheckoutError::OutOfStock(product_id),
            RejectKind::Network => CheckoutError::Network("connection refused".into()),
            RejectKind::Validation => CheckoutError::Validation("shipping address rejected".into()),
        };
        async move { Err(err) }
    }
}

/// A variant helper mirroring the storefront's size selector.
#[must_use]
pub fn size(label: &str) -> Variant {
    Variant::new(label)
}
