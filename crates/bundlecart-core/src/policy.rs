//! # Cart Sorting Policy
//!
//! Decides which cart mutations an add or a removal triggers.
//!
//! ## Add Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shopper adds product P                                                 │
//! │       │                                                                 │
//! │       ├── P is stand-alone? ──► Clear, then add P's force-sells @ 1     │
//! │       │                         (host then commits the add of P)        │
//! │       │                                                                 │
//! │       ├── P is "other"?     ──► for every stand-alone S in the cart:    │
//! │       │                         remove S and S's force-sells            │
//! │       │                                                                 │
//! │       └── neither           ──► Allow, nothing to do                    │
//! │                                                                         │
//! │  The request itself is never refused.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Removal Flow
//! Removing a stand-alone or force-sell line empties the whole cart: a
//! force-sell has no life of its own, and a stand-alone product without its
//! force-sells is not a valid purchase.

use crate::cart::CartView;
use crate::config::PolicyConfig;
use crate::mutation::CartMutation;
use crate::types::{LineId, ProductId};
use crate::FORCE_SELL_QUANTITY;

// =============================================================================
// Decisions
// =============================================================================

/// Outcome of the add-to-cart check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddDecision {
    /// Commit the request unchanged.
    Allow,
    /// Apply these mutations, then commit the request.
    AllowWithMutations(Vec<CartMutation>),
}

impl AddDecision {
    fn from_mutations(mutations: Vec<CartMutation>) -> Self {
        if mutations.is_empty() {
            AddDecision::Allow
        } else {
            AddDecision::AllowWithMutations(mutations)
        }
    }

    /// Mutations to apply before the request commits.
    pub fn mutations(&self) -> &[CartMutation] {
        match self {
            AddDecision::Allow => &[],
            AddDecision::AllowWithMutations(mutations) => mutations,
        }
    }
}

impl From<SortOutcome> for AddDecision {
    fn from(outcome: SortOutcome) -> Self {
        AddDecision::from_mutations(outcome.mutations)
    }
}

/// Outcome of the removal check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalDecision {
    /// Leave the rest of the cart alone.
    Keep,
    /// Empty the cart.
    ClearCart,
}

impl RemovalDecision {
    pub fn mutations(&self) -> Vec<CartMutation> {
        match self {
            RemovalDecision::Keep => Vec::new(),
            RemovalDecision::ClearCart => vec![CartMutation::Clear],
        }
    }
}

// =============================================================================
// Stand-alone Sorting
// =============================================================================

/// Whether a stand-alone product is being put in or taken out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Clear the cart and attach the force-sells.
    Add,
    /// Take the product and its force-sells out.
    Remove,
}

/// Result of sorting one stand-alone product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    /// False when the config could not be used or the product has no force-sells.
    pub sorted: bool,
    pub mutations: Vec<CartMutation>,
}

/// Sorts the cart around one stand-alone product.
///
/// ## Behavior
/// - Empty product id, no stand-alone products, or an empty force-sell map:
///   nothing happens, not even the clear.
/// - `Add`: `Clear`, then `Add` + `SetQuantity(1)` for every force-sell. The
///   stand-alone product itself is added by the host's own add request.
/// - `Remove`: `Remove` the product's line and each force-sell line present.
/// - A product with no force-sells keeps the clear/remove but reports
///   `sorted: false`.
///
/// ## Example
/// ```rust
/// use bundlecart_core::{sort_stand_alone, CartMutation, CartSnapshot, PolicyConfig, ProductId, SortMode};
///
/// let config = PolicyConfig::default();
/// let outcome = sort_stand_alone(ProductId::new(29359), SortMode::Add, &CartSnapshot::new(), &config);
///
/// // 29359 has no force-sells: the cart is still cleared
/// assert!(!outcome.sorted);
/// assert_eq!(outcome.mutations, vec![CartMutation::Clear]);
/// ```
pub fn sort_stand_alone(
    product_id: ProductId,
    mode: SortMode,
    cart: &impl CartView,
    config: &PolicyConfig,
) -> SortOutcome {
    if product_id.is_empty()
        || config.stand_alone_products.is_empty()
        || config.force_sell_map.is_empty()
    {
        return SortOutcome {
            sorted: false,
            mutations: Vec::new(),
        };
    }

    let mut mutations = Vec::new();
    match mode {
        SortMode::Add => mutations.push(CartMutation::Clear),
        SortMode::Remove => push_removal(&mut mutations, cart, cart.line_id_for(product_id)),
    }

    let force_sells = config.force_sells_for(product_id);
    if force_sells.is_empty() {
        return SortOutcome {
            sorted: false,
            mutations,
        };
    }

    for &force_sell in force_sells {
        let line_id = cart.line_id_for(force_sell);
        match mode {
            SortMode::Add => {
                mutations.push(CartMutation::add(force_sell, FORCE_SELL_QUANTITY));
                mutations.push(CartMutation::set_quantity(line_id, FORCE_SELL_QUANTITY));
            }
            SortMode::Remove => push_removal(&mut mutations, cart, line_id),
        }
    }

    SortOutcome {
        sorted: true,
        mutations,
    }
}

/// Queues a removal for a line that exists and is not already queued.
fn push_removal(mutations: &mut Vec<CartMutation>, cart: &impl CartView, line_id: LineId) {
    if cart.find_line(&line_id).is_none() {
        return;
    }
    let removal = CartMutation::remove(line_id);
    if !mutations.contains(&removal) {
        mutations.push(removal);
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Decides what adding `product_id` does to the cart.
///
/// ## Example
/// ```rust
/// use bundlecart_core::{decide_add, AddDecision, CartMutation, CartSnapshot, LineId, PolicyConfig, ProductId};
///
/// let config = PolicyConfig::default();
/// let cart = CartSnapshot::new()
///     .with_item(ProductId::new(29237), 1)
///     .with_item(ProductId::new(25556), 1);
///
/// // Adding an "other" product evicts the stand-alone bundle
/// let decision = decide_add(ProductId::new(28745), &cart, &config);
/// assert_eq!(
///     decision,
///     AddDecision::AllowWithMutations(vec![
///         CartMutation::remove(LineId::for_product(ProductId::new(29237))),
///         CartMutation::remove(LineId::for_product(ProductId::new(25556))),
///     ])
/// );
/// ```
pub fn decide_add(product_id: ProductId, cart: &impl CartView, config: &PolicyConfig) -> AddDecision {
    if config.is_stand_alone(product_id) {
        return sort_stand_alone(product_id, SortMode::Add, cart, config).into();
    }

    if config.is_other(product_id) {
        let mut mutations = Vec::new();
        for &stand_alone in &config.stand_alone_products {
            let in_cart = cart
                .items()
                .iter()
                .any(|item| item.product_id == stand_alone);
            if !in_cart {
                continue;
            }
            let outcome = sort_stand_alone(stand_alone, SortMode::Remove, cart, config);
            for mutation in outcome.mutations {
                if !mutations.contains(&mutation) {
                    mutations.push(mutation);
                }
            }
        }
        return AddDecision::from_mutations(mutations);
    }

    AddDecision::Allow
}

/// Decides whether removing `line_id` empties the cart.
///
/// `cart` must still contain the line being removed.
pub fn decide_removal(line_id: &LineId, cart: &impl CartView, config: &PolicyConfig) -> RemovalDecision {
    match cart.find_line(line_id) {
        Some(item)
            if config.is_stand_alone(item.product_id) || config.is_force_sell(item.product_id) =>
        {
            RemovalDecision::ClearCart
        }
        _ => RemovalDecision::Keep,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
