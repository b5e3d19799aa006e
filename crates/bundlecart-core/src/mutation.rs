//! # Cart Mutations
//!
//! Decisions describe cart changes as data. The adapter in `bundlecart-store`
//! interprets them against a real [`CartStore`](crate::cart::CartStore), in
//! order.
//!
//! ```text
//! decide_add(29237) ──► [ Clear,
//!                         Add { 25556, 1 },
//!                         SetQuantity { line-25556, 1 } ]
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::{LineId, ProductId};

/// A single command against the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CartMutation {
    /// Add a product (merges into its line when already present).
    Add {
        #[serde(rename = "productId")]
        product_id: ProductId,
        quantity: u32,
    },

    /// Remove a line.
    Remove {
        #[serde(rename = "lineId")]
        line_id: LineId,
    },

    /// Overwrite a line's quantity.
    SetQuantity {
        #[serde(rename = "lineId")]
        line_id: LineId,
        quantity: u32,
    },

    /// Empty the cart.
    Clear,
}

impl CartMutation {
    pub fn add(product_id: ProductId, quantity: u32) -> Self {
        CartMutation::Add {
            product_id,
            quantity,
        }
    }

    pub fn remove(line_id: LineId) -> Self {
        CartMutation::Remove { line_id }
    }

    pub fn set_quantity(line_id: LineId, quantity: u32) -> Self {
        CartMutation::SetQuantity { line_id, quantity }
    }
}

impl fmt::Display for CartMutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartMutation::Add {
                product_id,
                quantity,
            } => write!(f, "add {} x{}", product_id, quantity),
            CartMutation::Remove { line_id } => write!(f, "remove {}", line_id),
            CartMutation::SetQuantity { line_id, quantity } => {
                write!(f, "set {} to {}", line_id, quantity)
            }
            CartMutation::Clear => f.write_str("clear"),
        }
    }
}
