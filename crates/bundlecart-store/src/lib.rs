//! # bundlecart-store: Hook Adapter and Reference Cart
//!
//! Connects the pure decisions of `bundlecart-core` to a cart. The storefront
//! calls the three hooks on [`CartPolicy`]; the adapter asks the core what to
//! do, applies the resulting [`CartMutation`](bundlecart_core::CartMutation)s
//! to the cart, and publishes upsell notices.
//!
//! ## Hook Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront event          CartPolicy hook          Core decision       │
//! │  ────────────────          ───────────────          ─────────────       │
//! │  before add-to-cart  ───►  on_add_to_cart     ───►  decide_add          │
//! │  line removed        ───►  on_remove_cart_item ──►  decide_removal      │
//! │  cart page render    ───►  before_cart_render ───►  tier_upsell         │
//! │                                                     coupon_upsell       │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │                     apply_mutations(cart, ...)  /  NoticeSink::publish  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`memory`] - In-memory cart, shared cart, catalog, and notice log
//! - [`apply`] - Mutation interpreter
//! - [`hooks`] - The `CartPolicy` adapter
//! - [`config`] - Env and file driven configuration
//! - [`logging`] - Tracing subscriber setup
//! - [`error`] - Store error types

pub mod apply;
pub mod config;
pub mod error;
pub mod hooks;
pub mod logging;
pub mod memory;

pub use apply::{apply_mutations, ApplyReport};
pub use config::StoreConfig;
pub use error::{CartError, ConfigError};
pub use hooks::{CartPolicy, RenderContext, RenderReport};
pub use memory::{MemoryCart, MemoryCatalog, NoticeLog, SharedCart};

/// Maximum quantity of a single line in the reference cart.
pub const MAX_ITEM_QUANTITY: u32 = 999;

/// Maximum number of lines in the reference cart.
pub const MAX_CART_ITEMS: usize = 100;
