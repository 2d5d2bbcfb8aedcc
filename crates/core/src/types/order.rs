//! Orders and the shipping details collected at checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::OrderId;
use crate::types::line_item::LineItem;
use crate::types::status::OrderStatus;

/// Shipping details collected by the checkout form.
///
/// Payment fields never reach this type; they are handled entirely by the
/// payment surface and are not part of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
}

/// A placed order, as confirmed by the order service.
///
/// The line items are a snapshot of the cart at submission time. Once the
/// order exists they are immutable; the cart is cleared independently and
/// is not linked to the order by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<LineItem>,
    /// Subtotal + shipping + tax as computed at submission.
    pub total: Decimal,
    pub shipping_info: ShippingInfo,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
