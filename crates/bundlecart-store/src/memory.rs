//! # In-Memory Collaborators
//!
//! Reference implementations of the cart, catalog, and notice sink. Hosts
//! with their own cart implement the core traits directly; these back the
//! `policy-check` binary and the tests.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    MemoryCart Operations                                │
//! │                                                                         │
//! │  CartStore call             Effect                                      │
//! │  ───────────────            ──────                                      │
//! │  add(product, qty) ───────► merge into product's line, or push a line  │
//! │  set_quantity(line, n) ───► line.qty = n  (0 removes the line)         │
//! │  remove(line) ────────────► drop the line                              │
//! │  clear() ─────────────────► drop every line                            │
//! │                                                                         │
//! │  Subtotal = Σ unit price × quantity (unpriced products count as $0)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use bundlecart_core::{
    CartItem, CartSnapshot, CartStore, CartView, LineId, Money, NoticeSink, ProductCatalog,
    ProductId, TaxDisplay,
};

use crate::error::CartError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Memory Cart
// =============================================================================

/// A cart held in memory.
///
/// ## Invariants
/// - One line per product (adding the same product increases quantity)
/// - Quantity is always > 0
/// - At most `MAX_CART_ITEMS` lines, `MAX_ITEM_QUANTITY` per line
#[derive(Debug, Clone, Default)]
pub struct MemoryCart {
    items: Vec<CartItem>,
    coupons: Vec<String>,
    unit_prices: BTreeMap<ProductId, Money>,
    discount_total: Money,
    discount_tax: Money,
    tax_display: TaxDisplay,
}

impl MemoryCart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit prices used for the displayed subtotal.
    pub fn with_prices(mut self, prices: impl IntoIterator<Item = (ProductId, Money)>) -> Self {
        self.unit_prices.extend(prices);
        self
    }

    pub fn with_tax_display(mut self, tax_display: TaxDisplay) -> Self {
        self.tax_display = tax_display;
        self
    }

    /// Applies a coupon code (stored lowercased, like storefronts do).
    pub fn apply_coupon(&mut self, code: &str) {
        let code = code.trim().to_lowercase();
        if !code.is_empty() && !self.coupons.contains(&code) {
            self.coupons.push(code);
        }
    }

    /// Sets the discount amounts the coupons produce.
    pub fn set_discounts(&mut self, discount_total: Money, discount_tax: Money) {
        self.discount_total = discount_total;
        self.discount_tax = discount_tax;
    }

    /// Quantity of a product, 0 when absent.
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity)
            .unwrap_or(0)
    }

    /// `(product, quantity)` pairs sorted by product id.
    pub fn contents(&self) -> Vec<(ProductId, u32)> {
        let mut contents: Vec<_> = self
            .items
            .iter()
            .map(|item| (item.product_id, item.quantity))
            .collect();
        contents.sort();
        contents
    }

    /// Returns the number of lines in the cart.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Frozen copy for decisions that must not see later mutations.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            coupons: self.coupons.clone(),
            displayed_subtotal: self.displayed_subtotal(),
            discount_total: self.discount_total,
            discount_tax: self.discount_tax,
            tax_display: self.tax_display,
        }
    }

    fn position(&self, line_id: &LineId) -> Result<usize, CartError> {
        self.items
            .iter()
            .position(|item| &item.line_id == line_id)
            .ok_or_else(|| CartError::LineNotFound(line_id.clone()))
    }

    fn check_quantity(quantity: u32) -> Result<(), CartError> {
        if quantity > MAX_ITEM_QUANTITY {
            return Err(CartError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        Ok(())
    }
}

impl CartView for MemoryCart {
    fn items(&self) -> &[CartItem] {
        &self.items
    }

    fn active_discount_codes(&self) -> &[String] {
        &self.coupons
    }

    fn displayed_subtotal(&self) -> Money {
        self.items
            .iter()
            .map(|item| {
                self.unit_prices
                    .get(&item.product_id)
                    .copied()
                    .unwrap_or_default()
                    .multiply_quantity(i64::from(item.quantity))
            })
            .fold(Money::zero(), |total, line| total + line)
    }

    fn discount_total(&self) -> Money {
        self.discount_total
    }

    fn discount_tax(&self) -> Money {
        self.discount_tax
    }

    fn prices_include_tax(&self) -> bool {
        self.tax_display == TaxDisplay::Inclusive
    }
}

impl CartStore for MemoryCart {
    type Error = CartError;

    fn add(&mut self, product_id: ProductId, quantity: u32) -> Result<LineId, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let line_id = self.line_id_for(product_id);
        if let Ok(index) = self.position(&line_id) {
            let new_qty = self.items[index].quantity.saturating_add(quantity);
            Self::check_quantity(new_qty)?;
            self.items[index].quantity = new_qty;
            return Ok(line_id);
        }

        Self::check_quantity(quantity)?;
        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CartError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem {
            product_id,
            quantity,
            line_id: line_id.clone(),
        });
        Ok(line_id)
    }

    fn remove(&mut self, line_id: &LineId) -> Result<(), CartError> {
        let index = self.position(line_id)?;
        self.items.remove(index);
        Ok(())
    }

    fn set_quantity(&mut self, line_id: &LineId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(line_id);
        }
        Self::check_quantity(quantity)?;
        let index = self.position(line_id)?;
        self.items[index].quantity = quantity;
        Ok(())
    }

    fn clear(&mut self) {
        self.items.clear();
    }
}

// =============================================================================
// Shared Cart
// =============================================================================

/// A session cart shared between request handlers.
///
/// A hook holds the lock for its whole decide-and-apply step, so two
/// requests on one session cannot interleave their mutations.
#[derive(Debug, Clone, Default)]
pub struct SharedCart {
    cart: Arc<Mutex<MemoryCart>>,
}

impl SharedCart {
    pub fn new(cart: MemoryCart) -> Self {
        SharedCart {
            cart: Arc::new(Mutex::new(cart)),
        }
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&MemoryCart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust
    /// use bundlecart_core::{PolicyConfig, ProductId};
    /// use bundlecart_store::{CartPolicy, SharedCart};
    ///
    /// let policy = CartPolicy::new(PolicyConfig::default());
    /// let shared = SharedCart::default();
    /// shared.with_cart_mut(|cart| policy.add_to_cart(cart, ProductId::new(29237), 1)).unwrap();
    /// assert_eq!(shared.with_cart(|cart| cart.item_count()), 2);
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut MemoryCart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}

// =============================================================================
// Memory Catalog
// =============================================================================

/// Product catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    names: BTreeMap<ProductId, String>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, product_id: ProductId, name: impl Into<String>) {
        self.names.insert(product_id, name.into());
    }

    /// Catalog holding every product a policy mentions, named by id.
    pub fn covering(config: &bundlecart_core::PolicyConfig) -> Self {
        let mut catalog = Self::new();
        let ids = config
            .stand_alone_products
            .iter()
            .chain(&config.other_products)
            .copied()
            .chain(config.effective_force_sell_products())
            .chain(config.tier_upsells.iter().map(|rule| rule.product_id))
            .chain(config.coupon_upsells.iter().map(|rule| rule.product_id))
            .filter(|id| !id.is_empty());
        for id in ids {
            catalog.insert(id, format!("Product {}", id));
        }
        catalog
    }
}

impl ProductCatalog for MemoryCatalog {
    fn exists(&self, product_id: ProductId) -> bool {
        self.names.contains_key(&product_id)
    }

    fn display_name(&self, product_id: ProductId) -> Option<String> {
        self.names.get(&product_id).cloned()
    }
}

// =============================================================================
// Notice Log
// =============================================================================

/// Collects published notices in order.
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    messages: Vec<String>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Takes the notices, leaving the log empty.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

impl NoticeSink for NoticeLog {
    fn publish(&mut self, message: String) {
        self.messages.push(message);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bundlecart_core::PolicyConfig;

    fn id(raw: u64) -> ProductId {
        ProductId::new(raw)
    }

    #[test]
    fn test_add_same_product_increases_quantity() {
        let mut cart = MemoryCart::new();
        cart.add(id(28745), 2).unwrap();
        cart.add(id(28745), 3).unwrap();

        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.quantity_of(id(28745)), 5);
    }

    #[test]
    fn test_add_rejects_bad_quantities() {
        let mut cart = MemoryCart::new();
        assert_eq!(cart.add(id(1), 0), Err(CartError::ZeroQuantity));
        assert_eq!(
            cart.add(id(1), MAX_ITEM_QUANTITY + 1),
            Err(CartError::QuantityTooLarge {
                requested: MAX_ITEM_QUANTITY + 1,
                max: MAX_ITEM_QUANTITY
            })
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = MemoryCart::new();
        let line = cart.add(id(1), 4).unwrap();

        cart.set_quantity(&line, 1).unwrap();
        assert_eq!(cart.quantity_of(id(1)), 1);

        cart.set_quantity(&line, 0).unwrap();
        assert!(cart.is_empty());

        assert_eq!(cart.remove(&line), Err(CartError::LineNotFound(line.clone())));
    }

    #[test]
    fn test_subtotal_from_prices() {
        let mut cart = MemoryCart::new().with_prices([
            (id(1), Money::from_cents(1500)),
            (id(2), Money::from_cents(250)),
        ]);
        cart.add(id(1), 2).unwrap();
        cart.add(id(2), 1).unwrap();
        cart.add(id(3), 7).unwrap();

        assert_eq!(cart.displayed_subtotal(), Money::from_cents(3250));
    }

    #[test]
    fn test_coupons_are_normalised() {
        let mut cart = MemoryCart::new();
        cart.apply_coupon(" Free-Gift ");
        cart.apply_coupon("free-gift");

        assert_eq!(cart.active_discount_codes(), &["free-gift".to_string()]);
        assert!(cart.has_discount("FREE-GIFT"));
    }

    #[test]
    fn test_snapshot_matches_cart() {
        let mut cart = MemoryCart::new().with_prices([(id(1), Money::from_cents(700))]);
        cart.add(id(1), 1).unwrap();
        cart.set_discounts(Money::from_cents(100), Money::zero());

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items, cart.items().to_vec());
        assert_eq!(snapshot.displayed_subtotal, Money::from_cents(700));
        assert_eq!(snapshot.discount_total, Money::from_cents(100));
    }

    #[test]
    fn test_shared_cart_access() {
        let shared = SharedCart::new(MemoryCart::new());
        let other = shared.clone();

        other.with_cart_mut(|cart| cart.add(id(28745), 1)).unwrap();

        assert_eq!(shared.with_cart(|cart| cart.quantity_of(id(28745))), 1);
    }

    #[test]
    fn test_catalog_covering_policy() {
        let catalog = MemoryCatalog::covering(&PolicyConfig::default());
        assert!(catalog.exists(id(226)));
        assert!(catalog.exists(id(29444)));
        assert_eq!(catalog.display_name(id(28745)).as_deref(), Some("Product 28745"));
        assert!(!catalog.exists(id(1)));
    }

    #[test]
    fn test_notice_log_drain() {
        let mut log = NoticeLog::new();
        log.publish("one".to_string());
        assert_eq!(log.messages().len(), 1);
        assert_eq!(log.drain(), vec!["one".to_string()]);
        assert!(log.messages().is_empty());
    }
}
