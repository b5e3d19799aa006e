//! # Cart Policy Hooks
//!
//! [`CartPolicy`] is what a storefront wires into its cart events. Each hook
//! asks `bundlecart-core` for a decision and carries it out.
//!
//! ## Add Then Remove
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cart: { 28745 x2 }                                                     │
//! │                                                                         │
//! │  add_to_cart(29237, 1)                                                  │
//! │    on_add_to_cart ──► Clear, Add 25556, Set line-25556 = 1              │
//! │    commit add      ──► cart: { 29237 x1, 25556 x1 }                     │
//! │                                                                         │
//! │  remove_cart_item(line-25556)                                           │
//! │    on_remove_cart_item ──► ClearCart (force-sell)                       │
//! │                        ──► cart: { }                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The removal hook sees the cart before the line goes, like the storefront
//! event it mirrors. Mutations applied by a hook never re-enter the hooks.

use bundlecart_core::{
    coupon_upsell, decide_add, decide_removal, sort_stand_alone, tier_upsell, AddDecision,
    CartStore, CartView, LineId, NoticeSink, PolicyConfig, ProductCatalog, ProductId,
    RemovalDecision, SortMode, UpsellNotice,
};
use tracing::{debug, info, warn};
use url::Url;

use crate::apply::apply_mutations;
use crate::config::StoreConfig;
use crate::error::ConfigError;

// =============================================================================
// Render Context
// =============================================================================

/// The page being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    /// Current page URL, the base of every upsell link.
    pub page_url: Url,
    pub on_cart_page: bool,
}

impl RenderContext {
    pub fn cart_page(page_url: Url) -> Self {
        RenderContext {
            page_url,
            on_cart_page: true,
        }
    }
}

/// Notices published by one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub tier: Option<UpsellNotice>,
    pub coupon: Option<UpsellNotice>,
}

impl RenderReport {
    /// Number of notices published.
    pub fn published(&self) -> usize {
        usize::from(self.tier.is_some()) + usize::from(self.coupon.is_some())
    }
}

// =============================================================================
// Cart Policy
// =============================================================================

/// Storefront-facing adapter over an immutable [`PolicyConfig`].
#[derive(Debug, Clone)]
pub struct CartPolicy {
    config: PolicyConfig,
    cart_page_only: bool,
}

impl CartPolicy {
    /// Wraps a policy. Upsells render on the cart page only.
    pub fn new(config: PolicyConfig) -> Self {
        CartPolicy {
            config,
            cart_page_only: true,
        }
    }

    /// Also render upsells outside the cart page when `false`.
    pub fn with_cart_page_only(mut self, cart_page_only: bool) -> Self {
        self.cart_page_only = cart_page_only;
        self
    }

    /// Builds the adapter from loaded store configuration.
    pub fn from_store_config(store_config: &StoreConfig) -> Result<Self, ConfigError> {
        let config = store_config.load_policy()?;
        info!(
            stand_alone = config.stand_alone_products.len(),
            tiers = config.tier_upsells.len(),
            coupons = config.coupon_upsells.len(),
            "Cart policy ready"
        );
        Ok(Self::new(config).with_cart_page_only(store_config.cart_page_only))
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    // =========================================================================
    // Add
    // =========================================================================

    /// Add-to-cart validation hook.
    ///
    /// Runs before the storefront commits the add. Sorts the cart around the
    /// product and returns `passed` unchanged: the request is never refused.
    pub fn on_add_to_cart<S: CartStore>(
        &self,
        cart: &mut S,
        passed: bool,
        product_id: ProductId,
        quantity: u32,
    ) -> bool {
        let decision = if self.config.is_stand_alone(product_id) {
            let outcome = sort_stand_alone(product_id, SortMode::Add, &*cart, &self.config);
            debug!(product_id = %product_id, sorted = outcome.sorted, "Sorting stand-alone product");
            AddDecision::from(outcome)
        } else {
            decide_add(product_id, &*cart, &self.config)
        };
        let mutations = decision.mutations();
        if !mutations.is_empty() {
            info!(
                product_id = %product_id,
                quantity,
                mutations = mutations.len(),
                "Sorting cart for added product"
            );
            apply_mutations(cart, mutations);
        }

        passed
    }

    /// Runs the add hook, then commits the add.
    ///
    /// When the commit fails the cart is put back the way it was, so a
    /// refused add never leaves force-sells without their product.
    pub fn add_to_cart<S: CartStore + Clone>(
        &self,
        cart: &mut S,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineId, S::Error> {
        let before = cart.clone();
        self.on_add_to_cart(cart, true, product_id, quantity);
        match cart.add(product_id, quantity) {
            Ok(line_id) => Ok(line_id),
            Err(err) => {
                warn!(product_id = %product_id, quantity, error = %err, "Cart rejected the add, restoring cart");
                *cart = before;
                Err(err)
            }
        }
    }

    // =========================================================================
    // Remove
    // =========================================================================

    /// Cart-item removal hook.
    ///
    /// `cart` must still hold the line. Empties the cart when the line is a
    /// stand-alone or force-sell product.
    pub fn on_remove_cart_item<S: CartStore>(&self, cart: &mut S, line_id: &LineId) -> RemovalDecision {
        let decision = decide_removal(line_id, &*cart, &self.config);
        if decision == RemovalDecision::ClearCart {
            info!(line_id = %line_id, "Removed bundle line, emptying cart");
            apply_mutations(cart, &decision.mutations());
        }
        decision
    }

    /// Runs the removal hook, then removes the line if it is still there.
    pub fn remove_cart_item<S: CartStore>(
        &self,
        cart: &mut S,
        line_id: &LineId,
    ) -> Result<RemovalDecision, S::Error> {
        let decision = self.on_remove_cart_item(cart, line_id);
        if decision == RemovalDecision::Keep {
            cart.remove(line_id)?;
        }
        Ok(decision)
    }

    // =========================================================================
    // Render
    // =========================================================================

    /// Pre-render hook: publishes the tier notice, then the coupon notice.
    pub fn before_cart_render<C, P, N>(
        &self,
        context: &RenderContext,
        cart: &C,
        catalog: &P,
        sink: &mut N,
    ) -> RenderReport
    where
        C: CartView,
        P: ProductCatalog,
        N: NoticeSink,
    {
        if self.cart_page_only && !context.on_cart_page {
            return RenderReport::default();
        }

        let report = RenderReport {
            tier: tier_upsell(cart, catalog, &self.config),
            coupon: coupon_upsell(cart, catalog, &self.config),
        };

        for notice in report.tier.iter().chain(&report.coupon) {
            if notice.link.add_to_cart.is_none() && notice.link.apply_coupon.is_none() {
                warn!(product_id = %notice.product_id, "Upsell link has no arguments");
            }
            debug!(kind = ?notice.kind, product_id = %notice.product_id, "Publishing upsell notice");
            sink.publish(notice.render(&context.page_url));
        }

        report
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
