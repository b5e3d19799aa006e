//! # Collaborator Interfaces
//!
//! The policy never owns a cart, a catalog, or a notice queue. It talks to
//! them through the traits in this module.
//!
//! ## Read / Write Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartView  (read)                 CartStore: CartView  (write)          │
//! │  ─────────────────────            ───────────────────────────           │
//! │  items()                          add(product, qty)                     │
//! │  line_id_for(product)             remove(line)                          │
//! │  active_discount_codes()          set_quantity(line, qty)               │
//! │  displayed_subtotal()             clear()                               │
//! │  discount_total() / _tax()                                              │
//! │  prices_include_tax()                                                   │
//! │                                                                         │
//! │  Decisions take `&impl CartView`; only the adapter that applies         │
//! │  mutations ever sees a `CartStore`.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::money::Money;
use crate::types::{CartItem, LineId, ProductId};

// =============================================================================
// Cart View
// =============================================================================

/// Read access to a cart.
pub trait CartView {
    /// Lines in cart order.
    fn items(&self) -> &[CartItem];

    /// Coupon codes currently applied to the cart.
    fn active_discount_codes(&self) -> &[String];

    /// Subtotal as the shopper sees it (tax included or not, per display mode).
    fn displayed_subtotal(&self) -> Money;

    /// Sum of all discounts, excluding discount tax.
    fn discount_total(&self) -> Money;

    /// Tax portion of the discounts.
    fn discount_tax(&self) -> Money;

    /// Whether prices are displayed including tax.
    fn prices_include_tax(&self) -> bool;

    /// Line a product would occupy in this cart.
    fn line_id_for(&self, product_id: ProductId) -> LineId {
        LineId::for_product(product_id)
    }

    fn find_line(&self, line_id: &LineId) -> Option<&CartItem> {
        self.items().iter().find(|item| &item.line_id == line_id)
    }

    /// Whether the product already has its own line in the cart.
    fn contains_product(&self, product_id: ProductId) -> bool {
        self.find_line(&self.line_id_for(product_id)).is_some()
    }

    /// Coupon codes compare case-insensitively, the way storefronts store them.
    fn has_discount(&self, code: &str) -> bool {
        let code = code.trim();
        !code.is_empty()
            && self
                .active_discount_codes()
                .iter()
                .any(|applied| applied.trim().eq_ignore_ascii_case(code))
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// Write access to a cart.
pub trait CartStore: CartView {
    type Error: std::error::Error;

    /// Adds a product, merging into its existing line if present.
    fn add(&mut self, product_id: ProductId, quantity: u32) -> Result<LineId, Self::Error>;

    fn remove(&mut self, line_id: &LineId) -> Result<(), Self::Error>;

    fn set_quantity(&mut self, line_id: &LineId, quantity: u32) -> Result<(), Self::Error>;

    /// Empties the cart.
    fn clear(&mut self);
}

// =============================================================================
// Product Catalog
// =============================================================================

/// Product lookups.
pub trait ProductCatalog {
    fn exists(&self, product_id: ProductId) -> bool;

    fn display_name(&self, product_id: ProductId) -> Option<String>;
}

/// A plain id → name table is a catalog.
impl ProductCatalog for BTreeMap<ProductId, String> {
    fn exists(&self, product_id: ProductId) -> bool {
        self.contains_key(&product_id)
    }

    fn display_name(&self, product_id: ProductId) -> Option<String> {
        self.get(&product_id).cloned()
    }
}

// =============================================================================
// Notice Sink
// =============================================================================

/// Where rendered upsell messages go. Fire and forget.
pub trait NoticeSink {
    fn publish(&mut self, message: String);
}

impl NoticeSink for Vec<String> {
    fn publish(&mut self, message: String) {
        self.push(message);
    }
}

// =============================================================================
// Tax Display
// =============================================================================

/// How the storefront displays prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxDisplay {
    /// Price + tax shown separately.
    #[default]
    Exclusive,
    /// Displayed prices include tax.
    Inclusive,
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// A frozen copy of a cart, enough to run every decision against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,

    #[serde(default)]
    pub coupons: Vec<String>,

    #[serde(default)]
    pub displayed_subtotal: Money,

    #[serde(default)]
    pub discount_total: Money,

    #[serde(default)]
    pub discount_tax: Money,

    #[serde(default)]
    pub tax_display: TaxDisplay,
}

impl CartSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a line keyed by its product.
    pub fn with_item(mut self, product_id: ProductId, quantity: u32) -> Self {
        self.items.push(CartItem::new(product_id, quantity));
        self
    }

    pub fn with_coupon(mut self, code: impl Into<String>) -> Self {
        self.coupons.push(code.into());
        self
    }

    /// Sets the displayed subtotal and discount amounts.
    pub fn with_totals(mut self, subtotal: Money, discount: Money, discount_tax: Money) -> Self {
        self.displayed_subtotal = subtotal;
        self.discount_total = discount;
        self.discount_tax = discount_tax;
        self
    }

    pub fn with_tax_display(mut self, tax_display: TaxDisplay) -> Self {
        self.tax_display = tax_display;
        self
    }

    /// Product ids in cart order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.items.iter().map(|item| item.product_id).collect()
    }
}

impl CartView for CartSnapshot {
    fn items(&self) -> &[CartItem] {
        &self.items
    }

    fn active_discount_codes(&self) -> &[String] {
        &self.coupons
    }

    fn displayed_subtotal(&self) -> Money {
        self.displayed_subtotal
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

// =============================================================================
// Unit Tests
// =============================================================================
