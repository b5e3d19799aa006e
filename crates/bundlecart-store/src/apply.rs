//! # Mutation Interpreter
//!
//! Applies a decision's [`CartMutation`]s to any [`CartStore`], in order.
//!
//! A failing mutation is logged and skipped: a rule that cannot be applied
//! must never stop the shopper's own request from going through.

use bundlecart_core::{CartMutation, CartStore};
use tracing::{debug, warn};

/// What happened to a batch of mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: usize,
    pub failed: usize,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Applies `mutations` to `store` in order.
///
/// ## Example
/// ```rust
/// use bundlecart_core::{CartMutation, CartView, ProductId};
/// use bundlecart_store::{apply_mutations, MemoryCart};
///
/// let mut cart = MemoryCart::new();
/// let report = apply_mutations(
///     &mut cart,
///     &[CartMutation::add(ProductId::new(25556), 1), CartMutation::Clear],
/// );
/// assert_eq!(report.applied, 2);
/// assert!(cart.items().is_empty());
/// ```
pub fn apply_mutations<S: CartStore>(store: &mut S, mutations: &[CartMutation]) -> ApplyReport {
    let mut report = ApplyReport::default();

    for mutation in mutations {
        let result = match mutation {
            CartMutation::Add {
                product_id,
                quantity,
            } => store.add(*product_id, *quantity).map(|_| ()),
            CartMutation::Remove { line_id } => store.remove(line_id),
            CartMutation::SetQuantity { line_id, quantity } => {
                store.set_quantity(line_id, *quantity)
            }
            CartMutation::Clear => {
                store.clear();
                Ok(())
            }
        };

        match result {
            Ok(()) => {
                debug!(mutation = %mutation, "Applied cart mutation");
                report.applied += 1;
            }
            Err(e) => {
                warn!(mutation = %mutation, error = %e, "Skipped cart mutation");
                report.failed += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCart;
    use bundlecart_core::{CartView, LineId, ProductId};

    #[test]
    fn test_applies_in_order() {
        let mut cart = MemoryCart::new();
        cart.add(ProductId::new(28745), 3).unwrap();

        let report = apply_mutations(
            &mut cart,
            &[
                CartMutation::Clear,
                CartMutation::add(ProductId::new(29234), 1),
                CartMutation::set_quantity(LineId::for_product(ProductId::new(29234)), 1),
            ],
        );

        assert_eq!(report, ApplyReport { applied: 3, failed: 0 });
        assert_eq!(cart.contents(), vec![(ProductId::new(29234), 1)]);
    }

    #[test]
    fn test_failure_is_skipped() {
        let mut cart = MemoryCart::new();

        let report = apply_mutations(
            &mut cart,
            &[
                CartMutation::remove(LineId::new("missing")),
                CartMutation::add(ProductId::new(1), 1),
            ],
        );

        assert!(!report.is_clean());
        assert_eq!(report.applied, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(cart.items().len(), 1);
    }
}
