//! The canonical ordered set of line items for one cart instance.

use silk_road_core::{LineItem, LineKey};

/// Insertion-ordered collection of cart lines, keyed by `(product, variant)`.
///
/// Order is preserved for display; it carries no semantic weight for totals.
/// The store upholds two invariants: no two lines share a key, and every
/// stored quantity is at least 1 (a line that would reach zero is removed).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemStore {
    lines: Vec<LineItem>,
}

impl LineItemStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Rebuild a store from a persisted snapshot.
    ///
    /// Snapshots written by older sessions may contain duplicate keys or
    /// zero quantities; both are repaired here (duplicates merge, zero-qty
    /// lines drop) so the invariants hold from the first command on.
    #[must_use]
    pub fn from_snapshot(snapshot: Vec<LineItem>) -> Self {
        let mut store = Self::new();
        for line in snapshot {
            if line.quantity > 0 {
                store.upsert(line);
            }
        }
        store
    }

    /// Look up a line by key.
    #[must_use]
    pub fn find(&self, key: &LineKey) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.key() == *key)
    }

    /// Insert a line, or merge quantities if the key is already present.
    ///
    /// On merge the stored name and unit price win; the incoming line only
    /// contributes its quantity. New lines are appended, preserving order.
    pub fn upsert(&mut self, item: LineItem) {
        let key = item.key();
        match self.lines.iter_mut().find(|line| line.key() == key) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => self.lines.push(item),
        }
    }

    /// Delete a line. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &LineKey) {
        self.lines.retain(|line| line.key() != *key);
    }

    /// Replace a line's quantity in place, preserving its position.
    ///
    /// A quantity of zero is equivalent to [`Self::remove`]. Setting the
    /// quantity of an absent key is a no-op.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) {
        if quantity == 0 {
            self.remove(key);
        } else if let Some(line) = self.lines.iter_mut().find(|line| line.key() == *key) {
            line.quantity = quantity;
        }
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Ordered view of the lines.
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.lines.iter()
    }

    /// The lines as a slice, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Owned copy of the lines, for persistence or order submission.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LineItem> {
        self.lines.clone()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// True when the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity))
    }
}

impl<'a> IntoIterator for &'a LineItemStore {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use silk_road_core::{ProductId, Variant};

    fn item(id: i64, variant: Variant, qty: u32) -> LineItem {
        LineItem {
            product_id: ProductId::new(id),
            name: format!("product-{id}"),
            variant,
            quantity: qty,
            unit_price: Decimal::new(1000, 2),
        }
    }

    fn key(id: i64, variant: Variant) -> LineKey {
        LineKey::new(ProductId::new(id), variant)
    }

    #[test]
    fn test_upsert_appends_new_lines_in_order() {
        let mut store = LineItemStore::new();
        store.upsert(item(1, Variant::none(), 1));
        store.upsert(item(2, Variant::none(), 1));
        store.upsert(item(3, Variant::none(), 1));

        let ids: Vec<i64> = store.iter().map(|l| l.product_id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_upsert_merges_quantities_on_duplicate_key() {
        let mut store = LineItemStore::new();
        store.upsert(item(1, Variant::new("M"), 2));
        store.upsert(item(1, Variant::new("M"), 3));

        assert_eq!(store.len(), 1);
        let line = store.find(&key(1, Variant::new("M"))).unwrap();
        assert_eq!(line.quantity, 5);
    }

    #[test]
    fn test_upsert_merge_keeps_stored_price() {
        let mut store = LineItemStore::new();
        store.upsert(item(1, Variant::none(), 1));

        let mut repriced = item(1, Variant::none(), 1);
        repriced.unit_price = Decimal::new(9999, 2);
        store.upsert(repriced);

        let line = store.find(&key(1, Variant::none())).unwrap();
        assert_eq!(line.unit_price, Decimal::new(1000, 2));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_variants_are_distinct_lines() {
        let mut store = LineItemStore::new();
        store.upsert(item(1, Variant::new("M"), 1));
        store.upsert(item(1, Variant::new("L"), 1));

        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = LineItemStore::new();
        store.upsert(item(1, Variant::none(), 1));

        store.remove(&key(2, Variant::none()));
        assert_eq!(store.len(), 1);

        store.remove(&key(1, Variant::none()));
        store.remove(&key(1, Variant::none()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut store = LineItemStore::new();
        store.upsert(item(1, Variant::none(), 4));
        store.set_quantity(&key(1, Variant::none()), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_quantity_preserves_position() {
        let mut store = LineItemStore::new();
        store.upsert(item(1, Variant::none(), 1));
        store.upsert(item(2, Variant::none(), 1));
        store.upsert(item(3, Variant::none(), 1));

        store.set_quantity(&key(2, Variant::none()), 7);

        let line = store.lines().get(1).unwrap();
        assert_eq!(line.product_id.as_i64(), 2);
        assert_eq!(line.quantity, 7);
    }

    #[test]
    fn test_set_quantity_replaces_rather_than_adds() {
        let mut store = LineItemStore::new();
        store.upsert(item(1, Variant::none(), 5));
        store.set_quantity(&key(1, Variant::none()), 3);
        assert_eq!(store.find(&key(1, Variant::none())).unwrap().quantity, 3);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut store = LineItemStore::new();
        store.upsert(item(1, Variant::none(), 2));
        store.upsert(item(2, Variant::none(), 3));
        assert_eq!(store.item_count(), 5);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_from_snapshot_repairs_duplicates_and_zeroes() {
        let snapshot = vec![
            item(1, Variant::none(), 2),
            item(2, Variant::none(), 0),
            item(1, Variant::none(), 3),
        ];
        let store = LineItemStore::from_snapshot(snapshot);

        assert_eq!(store.len(), 1);
        assert_eq!(store.find(&key(1, Variant::none())).unwrap().quantity, 5);
    }
}
