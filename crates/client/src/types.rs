//! Wire types for the marketplace REST API.
//!
//! Field names follow the JSON the service exchanges (camelCase). Decimal
//! amounts travel as strings to preserve precision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use silk_road_cart::ProductInfo;
use silk_road_core::{CategoryId, LineItem, ProductId, ShippingInfo};

/// A catalog product as returned by `GET /products/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock_quantity: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default = "default_true")]
    pub available: bool,
}

const fn default_true() -> bool {
    true
}

impl From<&Product> for ProductInfo {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
        }
    }
}

/// One page of a paged listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    /// Zero-based page index.
    pub number: u32,
    pub size: u32,
}

impl<T> Page<T> {
    /// Whether a following page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }
}

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<LineItem>,
    pub shipping_info: ShippingInfo,
    /// Engine-computed grand total, verified server-side.
    pub total: Decimal,
}

/// Non-success response body from the service.
///
/// Stock rejections carry the failing product so the caller can surface it
/// without parsing the human-readable message.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
}

impl ErrorBody {
    /// Error code used by the service for stock rejections.
    pub const OUT_OF_STOCK: &'static str = "OUT_OF_STOCK";

    /// Best human-readable description available.
    #[must_use]
    pub fn detail(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "(no detail provided)".to_string())
    }
}
