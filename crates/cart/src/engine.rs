//! The cart command surface.
//!
//! One engine per user session, exactly one writer. Commands are synchronous
//! and atomic: a failed command leaves the store unchanged. Every successful
//! mutation broadcasts a [`CartSummary`] to subscribers and snapshots the
//! lines to the persistence adapter in the background.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rust_decimal::Decimal;
use serde::Serialize;
use silk_road_core::{LineItem, LineKey, Money, Order, ProductId, ShippingInfo, Variant};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::error::CartError;
use crate::persistence::PersistenceAdapter;
use crate::store::LineItemStore;
use crate::sync::RemoteSync;

/// Orders whose subtotal is strictly above this ship free.
#[must_use]
pub fn shipping_threshold() -> Decimal {
    Decimal::ONE_HUNDRED
}

/// Flat fee charged at or below the free-shipping threshold.
#[must_use]
pub fn flat_shipping_fee() -> Decimal {
    Decimal::TEN
}

/// Sales tax applied to the subtotal.
#[must_use]
pub fn tax_rate() -> Decimal {
    Decimal::new(8, 2) // 8%
}

/// The product details captured into a line at add time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInfo {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
}

/// The cart's two states, derived from line count on every command.
///
/// Checkout is not a state: it is an external operation that, on success,
/// forces a transition to `Empty` by clearing the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    Empty,
    NonEmpty,
}

/// Derived totals; never stored, always recomputed from the lines.
///
/// All values keep full decimal precision. Round for presentation only
/// (e.g., via [`silk_road_core::Money`]), never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of quantities across lines.
    pub item_count: u32,
    /// Number of distinct lines.
    pub line_count: usize,
    /// Sum of `quantity * unit_price` over lines.
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    /// `subtotal + shipping + tax`.
    pub total: Decimal,
}

impl CartTotals {
    fn compute(store: &LineItemStore) -> Self {
        let subtotal: Decimal = store.iter().map(LineItem::line_total).sum();
        let shipping = if subtotal > shipping_threshold() {
            Decimal::ZERO
        } else {
            flat_shipping_fee()
        };
        let tax = subtotal * tax_rate();
        Self {
            item_count: store.item_count(),
            line_count: store.len(),
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// The subtotal as display-ready money.
    #[must_use]
    pub const fn subtotal_money(&self) -> Money {
        Money::usd(self.subtotal)
    }

    /// The shipping charge as display-ready money.
    #[must_use]
    pub const fn shipping_money(&self) -> Money {
        Money::usd(self.shipping)
    }

    /// The tax as display-ready money.
    #[must_use]
    pub const fn tax_money(&self) -> Money {
        Money::usd(self.tax)
    }

    /// The grand total as display-ready money.
    ///
    /// Totals carry full precision internally; [`Money`] rounds to cents
    /// only when rendered.
    #[must_use]
    pub const fn total_money(&self) -> Money {
        Money::usd(self.total)
    }
}

/// Change notification payload broadcast after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSummary {
    pub state: CartState,
    pub totals: CartTotals,
}

/// The cart engine: validates commands, mutates the line-item store, and
/// coordinates the persistence and remote-sync adapters.
pub struct CartEngine<P> {
    store: LineItemStore,
    persistence: Arc<P>,
    changes: watch::Sender<CartSummary>,
    /// Sequence number handed to each background save.
    save_seq: AtomicU64,
    /// Highest sequence a save task has claimed. The lock serializes saves
    /// for this cart; the sequence check drops snapshots superseded by a
    /// newer mutation before they reach the adapter.
    save_gate: Arc<Mutex<u64>>,
}

impl<P: PersistenceAdapter> CartEngine<P> {
    /// Create an engine, restoring any snapshot the adapter holds.
    ///
    /// Corrupt or absent snapshots restore as an empty cart.
    pub async fn load(persistence: P) -> Self {
        let store = LineItemStore::from_snapshot(persistence.load().await);
        Self::with_store(store, persistence)
    }

    fn with_store(store: LineItemStore, persistence: P) -> Self {
        let summary = CartSummary {
            state: state_of(&store),
            totals: CartTotals::compute(&store),
        };
        let (changes, _) = watch::channel(summary);
        Self {
            store,
            persistence: Arc::new(persistence),
            changes,
            save_seq: AtomicU64::new(0),
            save_gate: Arc::new(Mutex::new(0)),
        }
    }

    /// Add `quantity` of a product selection to the cart.
    ///
    /// If the `(product, variant)` key already has a line, quantities merge
    /// and the originally captured price is kept.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] if `quantity` is zero.
    /// - [`CartError::InvalidKey`] if the product ID is not positive.
    /// - [`CartError::InvalidPrice`] if the unit price is negative.
    pub fn add_to_cart(
        &mut self,
        product: &ProductInfo,
        quantity: u32,
        variant: Variant,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if product.id.as_i64() <= 0 {
            return Err(CartError::InvalidKey(product.id));
        }
        if product.unit_price.is_sign_negative() {
            return Err(CartError::InvalidPrice);
        }

        self.store.upsert(LineItem {
            product_id: product.id,
            name: product.name.clone(),
            variant,
            quantity,
            unit_price: product.unit_price,
        });
        self.after_mutation();
        Ok(())
    }

    /// Remove a line. Removing an absent key is a no-op, not an error.
    pub fn remove_from_cart(&mut self, product_id: ProductId, variant: Variant) {
        self.store.remove(&LineKey::new(product_id, variant));
        self.after_mutation();
    }

    /// Set a line's quantity exactly (this does not add).
    ///
    /// A quantity of zero means removal, matching the add/remove asymmetry
    /// of the storefronts. Updating an absent key is a no-op.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32, variant: Variant) {
        self.store
            .set_quantity(&LineKey::new(product_id, variant), quantity);
        self.after_mutation();
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.store.clear();
        self.after_mutation();
    }

    /// Submit the cart to the order service and, only on success, clear it.
    ///
    /// `OutOfStock` and `Network` failures leave the lines exactly as they
    /// were; the user resolves or retries.
    ///
    /// Taking `&mut self` across the await point means a second submission
    /// cannot be issued on this cart while one is in flight.
    ///
    /// # Errors
    ///
    /// [`CartError::EmptyCart`] for an empty cart, otherwise any
    /// [`crate::CheckoutError`] from the sync adapter.
    pub async fn checkout<S: RemoteSync>(
        &mut self,
        sync: &S,
        shipping: ShippingInfo,
    ) -> Result<Order, CartError> {
        if self.store.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let total = self.totals().total;
        let order = sync
            .submit_order(self.store.lines(), &shipping, total)
            .await?;

        debug!(order_id = %order.id, "order confirmed, clearing cart");
        self.store.clear();
        self.after_mutation();
        Ok(order)
    }

    /// Current derived totals.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(&self.store)
    }

    /// `Empty` or `NonEmpty`, derived from line count.
    #[must_use]
    pub fn state(&self) -> CartState {
        state_of(&self.store)
    }

    /// The lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        self.store.lines()
    }

    /// Look up one line.
    #[must_use]
    pub fn find(&self, key: &LineKey) -> Option<&LineItem> {
        self.store.find(key)
    }

    /// Subscribe to change notifications.
    ///
    /// The receiver observes a [`CartSummary`] after every mutation; a UI
    /// layer watches this instead of re-deriving cart state per render.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.changes.subscribe()
    }

    fn after_mutation(&self) {
        self.changes.send_replace(CartSummary {
            state: self.state(),
            totals: self.totals(),
        });
        self.persist_in_background();
    }

    /// Snapshot the lines without blocking the caller. A save failure is
    /// logged and swallowed; the in-memory cart stays authoritative until
    /// the next successful save.
    ///
    /// Saves for one cart are serialized through `save_gate` and sequenced,
    /// so a slow earlier save can never overwrite a newer snapshot with a
    /// stale one.
    fn persist_in_background(&self) {
        let lines = self.store.snapshot();
        let persistence = Arc::clone(&self.persistence);
        let gate = Arc::clone(&self.save_gate);
        let seq = self.save_seq.fetch_add(1, Ordering::SeqCst) + 1;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let mut latest = gate.lock().await;
                    if seq <= *latest {
                        debug!(seq, "dropping superseded cart snapshot");
                        return;
                    }
                    *latest = seq;
                    if let Err(e) = persistence.save(&lines).await {
                        warn!(error = %e, "cart snapshot save failed, continuing in memory");
                    }
                });
            }
            Err(_) => debug!("no async runtime, skipping background cart save"),
        }
    }
}

fn state_of(store: &LineItemStore) -> CartState {
    if store.is_empty() {
        CartState::Empty
    } else {
        CartState::NonEmpty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn product(id: i64, price_cents: i64) -> ProductInfo {
        ProductInfo {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            unit_price: Decimal::new(price_cents, 2),
        }
    }

    async fn engine() -> CartEngine<MemoryStore> {
        CartEngine::load(MemoryStore::new()).await
    }

    #[tokio::test]
    async fn test_add_rejects_zero_quantity() {
        let mut cart = engine().await;
        let err = cart
            .add_to_cart(&product(1, 1000), 0, Variant::none())
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidQuantity));
        assert!(cart.lines().is_empty());
    }

    #[tokio::test]
    async fn test_add_rejects_nonpositive_product_id() {
        let mut cart = engine().await;
        let err = cart
            .add_to_cart(&product(0, 1000), 1, Variant::none())
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn test_add_rejects_negative_price() {
        let mut cart = engine().await;
        let bad = ProductInfo {
            id: ProductId::new(1),
            name: "negative".into(),
            unit_price: Decimal::new(-100, 2),
        };
        let err = cart.add_to_cart(&bad, 1, Variant::none()).unwrap_err();
        assert!(matches!(err, CartError::InvalidPrice));
        assert!(cart.lines().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_add_merges_quantities() {
        let mut cart = engine().await;
        cart.add_to_cart(&product(1, 1000), 2, Variant::none())
            .unwrap();
        cart.add_to_cart(&product(1, 1000), 3, Variant::none())
            .unwrap();

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes_line() {
        let mut cart = engine().await;
        cart.add_to_cart(&product(1, 1000), 3, Variant::none())
            .unwrap();
        cart.update_quantity(ProductId::new(1), 0, Variant::none());

        assert_eq!(cart.state(), CartState::Empty);
    }

    #[tokio::test]
    async fn test_update_quantity_sets_exactly() {
        let mut cart = engine().await;
        cart.add_to_cart(&product(1, 1000), 3, Variant::none())
            .unwrap();
        cart.update_quantity(ProductId::new(1), 2, Variant::none());

        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_noop() {
        let mut cart = engine().await;
        cart.add_to_cart(&product(1, 1000), 1, Variant::none())
            .unwrap();
        cart.remove_from_cart(ProductId::new(99), Variant::none());

        assert_eq!(cart.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_totals_worked_scenario() {
        // Empty cart -> add 2 x $29.99.
        let mut cart = engine().await;
        cart.add_to_cart(&product(1, 2999), 2, Variant::none())
            .unwrap();

        let totals = cart.totals();
        assert_eq!(totals.item_count, 2);
        assert_eq!(totals.line_count, 1);
        assert_eq!(totals.subtotal, Decimal::new(5998, 2));
        assert_eq!(totals.shipping, Decimal::TEN);
        assert_eq!(totals.tax, Decimal::new(47984, 4));
        assert_eq!(totals.total, Decimal::new(747_784, 4));

        // Full precision internally, cents only when rendered as money.
        assert_eq!(totals.subtotal_money().to_string(), "$59.98");
        assert_eq!(totals.tax_money().to_string(), "$4.80");
        assert_eq!(totals.shipping_money().to_string(), "$10.00");
        assert_eq!(totals.total_money().to_string(), "$74.78");
        assert_eq!(totals.total_money().amount, totals.total);
    }

    #[tokio::test]
    async fn test_free_shipping_strictly_above_threshold() {
        let mut cart = engine().await;
        cart.add_to_cart(&product(1, 10_000), 1, Variant::none())
            .unwrap();
        assert_eq!(cart.totals().shipping, Decimal::TEN);

        cart.update_quantity(ProductId::new(1), 0, Variant::none());
        cart.add_to_cart(&product(2, 10_001), 1, Variant::none())
            .unwrap();
        assert_eq!(cart.totals().shipping, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_variants_key_distinct_lines() {
        let mut cart = engine().await;
        cart.add_to_cart(&product(1, 1000), 1, Variant::new("M"))
            .unwrap();
        cart.add_to_cart(&product(1, 1000), 1, Variant::new("L"))
            .unwrap();

        assert_eq!(cart.totals().line_count, 2);
        assert_eq!(cart.totals().item_count, 2);
    }

    #[tokio::test]
    async fn test_subtotal_recomputable_from_lines() {
        let mut cart = engine().await;
        cart.add_to_cart(&product(1, 2999), 2, Variant::none())
            .unwrap();
        cart.add_to_cart(&product(2, 499), 7, Variant::new("L"))
            .unwrap();
        cart.update_quantity(ProductId::new(2), 3, Variant::new("L"));

        let independent: Decimal = cart.lines().iter().map(LineItem::line_total).sum();
        assert_eq!(cart.totals().subtotal, independent);
    }

    #[tokio::test]
    async fn test_subscribers_observe_mutations() {
        let mut cart = engine().await;
        let rx = cart.subscribe();
        assert_eq!(rx.borrow().state, CartState::Empty);

        cart.add_to_cart(&product(1, 2999), 2, Variant::none())
            .unwrap();

        let summary = rx.borrow();
        assert_eq!(summary.state, CartState::NonEmpty);
        assert_eq!(summary.totals.item_count, 2);
    }

    #[tokio::test]
    async fn test_load_restores_persisted_lines() {
        let seeded = MemoryStore::with_lines(vec![LineItem {
            product_id: ProductId::new(1),
            name: "restored".into(),
            variant: Variant::none(),
            quantity: 4,
            unit_price: Decimal::new(500, 2),
        }]);

        let cart = CartEngine::load(seeded).await;
        assert_eq!(cart.state(), CartState::NonEmpty);
        assert_eq!(cart.totals().item_count, 4);
    }
}
