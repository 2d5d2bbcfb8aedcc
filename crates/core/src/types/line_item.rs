//! Cart line items and their identity keys.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A product sub-selection (e.g., a size) that participates in line identity.
///
/// Absence is itself a distinct variant: `Variant::default()` ("no selection")
/// and `Variant::new("M")` key different cart lines for the same product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variant(Option<String>);

impl Variant {
    /// Create a variant from a selection label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(Some(label.into()))
    }

    /// The absent ("default") variant.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// The selection label, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(label) => write!(f, "{label}"),
            None => write!(f, "default"),
        }
    }
}

impl From<Option<String>> for Variant {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl From<&str> for Variant {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Unique identity of a line within one cart: `(product, variant)`.
///
/// No two lines in a cart may share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub variant: Variant,
}

impl LineKey {
    /// Build a key from its parts.
    pub fn new(product_id: ProductId, variant: impl Into<Variant>) -> Self {
        Self {
            product_id,
            variant: variant.into(),
        }
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.product_id, self.variant)
    }
}

/// One entry in a cart: a product selection with quantity and captured price.
///
/// The unit price is captured at add time; a later catalog price change does
/// not retroactively alter existing lines unless an explicit repricing runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    /// Product display name, captured alongside the price.
    pub name: String,
    #[serde(default)]
    pub variant: Variant,
    /// Always >= 1; a line that would reach zero is removed, not zeroed.
    pub quantity: u32,
    /// Non-negative, in the cart's currency.
    pub unit_price: Decimal,
}

impl LineItem {
    /// Identity of this line within its cart.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id,
            variant: self.variant.clone(),
        }
    }

    /// `quantity * unit_price`, full precision.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}
