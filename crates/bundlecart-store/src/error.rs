//! # Store Error Types
//!
//! Errors raised at the edges: the reference cart's mutation API and config
//! loading.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  CartError (MemoryCart)                                                 │
//! │       │                                                                 │
//! │       ├──► apply_mutations: logged, mutation skipped                    │
//! │       └──► CartPolicy::add_to_cart / remove_cart_item: returned         │
//! │                                                                         │
//! │  ConfigError (file / env / validation error)                            │
//! │       │                                                                 │
//! │       └──► StoreConfig::load_policy: caller refuses to start            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use bundlecart_core::{CoreError, LineId, ValidationError};
use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Reference cart mutation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The line is not in the cart.
    #[error("Line not in cart: {0}")]
    LineNotFound(LineId),

    /// Quantity must be at least one when adding.
    #[error("Quantity must be positive")]
    ZeroQuantity,

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: u32, max: u32 },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },
}

// =============================================================================
// Config Error
// =============================================================================

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Failed to read policy file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Policy file {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: CoreError,
    },

    #[error("Policy config rejected: {0}")]
    Invalid(#[from] ValidationError),
}
