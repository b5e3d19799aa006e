//! # Domain Types
//!
//! Identifiers and cart lines shared by every decision.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ProductId     │   │     LineId      │   │    CartItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  u64 catalog id │   │  opaque string  │   │  product_id     │       │
//! │  │  0 = "empty"    │   │  issued by cart │   │  quantity       │       │
//! │  │                 │   │                 │   │  line_id        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A cart holds at most one line per product, so a line id can always be
//! derived from the product it holds ([`LineId::for_product`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

// =============================================================================
// Product Id
// =============================================================================

/// Catalog identifier of a product. The default is the empty id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductId(u64);

impl ProductId {
    /// Wraps a raw catalog id.
    #[inline]
    pub const fn new(id: u64) -> Self {
        ProductId(id)
    }

    /// Returns the raw catalog id.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Zero is never a real product; config tables use it to mean "unset".
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ProductId)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId(id)
    }
}

// =============================================================================
// Line Id
// =============================================================================

/// Identifier of a line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineId(String);

impl LineId {
    /// Wraps a line id issued by a host cart.
    pub fn new(id: impl Into<String>) -> Self {
        LineId(id.into())
    }

    /// The line id a product occupies in a cart that keys lines by product.
    ///
    /// ## Example
    /// ```rust
    /// use bundlecart_core::types::{LineId, ProductId};
    ///
    /// assert_eq!(LineId::for_product(ProductId::new(25556)).as_str(), "line-25556");
    /// ```
    pub fn for_product(product_id: ProductId) -> Self {
        LineId(format!("line-{}", product_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line of a cart snapshot.
///
/// Owned and mutated by the host cart; the policy only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product held by this line.
    pub product_id: ProductId,

    /// Quantity on the line.
    pub quantity: u32,

    /// Cart-issued line identifier.
    pub line_id: LineId,
}

impl CartItem {
    /// Creates a line keyed by its product.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        CartItem {
            product_id,
            quantity,
            line_id: LineId::for_product(product_id),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
