//! # bundlecart-core: Pure Cart Policy Logic
//!
//! This crate decides what should happen to a shopping cart when products are
//! added or removed, and which upsell message the shopper should see. It never
//! touches a real cart: every decision is a value (a list of
//! [`CartMutation`]s, a [`RemovalDecision`], an [`UpsellNotice`]) that the
//! host applies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bundlecart Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Storefront (host cart + event hooks)             │   │
//! │  │   before add ──► after remove ──► before cart render            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              bundlecart-store (CartPolicy adapter)              │   │
//! │  │      applies mutations, publishes notices, logs decisions       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ bundlecart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  config   │  │  policy   │  │  upsell   │  │ mutation  │  │   │
//! │  │   │  tables   │  │ add/remove│  │ tier/code │  │ Add/Clear │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOGGING • NO GLOBALS • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Identifiers and cart lines (ProductId, LineId, CartItem)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Collaborator interfaces (CartView, CartStore, ProductCatalog, NoticeSink)
//! - [`config`] - Immutable policy tables
//! - [`mutation`] - The `CartMutation` command type
//! - [`policy`] - Add and removal decisions
//! - [`upsell`] - Tier and coupon upsell selection
//! - [`validation`] - Config validation rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bundlecart_core::{decide_add, AddDecision, CartMutation, CartSnapshot, PolicyConfig, ProductId};
//!
//! let config = PolicyConfig::default();
//! let cart = CartSnapshot::default();
//!
//! // 29237 is a stand-alone product with one force-sell (25556)
//! let decision = decide_add(ProductId::new(29237), &cart, &config);
//! let AddDecision::AllowWithMutations(mutations) = decision else {
//!     panic!("stand-alone products always sort the cart");
//! };
//! assert_eq!(mutations[0], CartMutation::Clear);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod config;
pub mod error;
pub mod money;
pub mod mutation;
pub mod policy;
pub mod types;
pub mod upsell;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartSnapshot, CartStore, CartView, NoticeSink, ProductCatalog, TaxDisplay};
pub use config::{NextUpsell, PolicyConfig, UpsellCouponRule, UpsellTierRule};
pub use error::{CoreError, CoreResult, Severity, ValidationError};
pub use money::Money;
pub use mutation::CartMutation;
pub use policy::{decide_add, decide_removal, sort_stand_alone, AddDecision, RemovalDecision, SortMode, SortOutcome};
pub use types::{CartItem, LineId, ProductId};
pub use upsell::{coupon_upsell, net_total, select_coupon_rule, select_tier_rule, tier_upsell, UpsellLink, UpsellNotice};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Link label used when an upsell rule has no button label of its own.
pub const DEFAULT_BUTTON_LABEL: &str = "Click Here to Upgrade";

/// Quantity every force-sell product is pinned to.
pub const FORCE_SELL_QUANTITY: u32 = 1;

/// Query argument that adds a product to the cart.
pub const ADD_TO_CART_ARG: &str = "add-to-cart";

/// Query argument that applies a coupon to the cart.
pub const APPLY_COUPON_ARG: &str = "apply_coupon";
