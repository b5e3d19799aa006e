//! # Error Types
//!
//! Domain-specific error types for bundlecart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bundlecart-core errors (this file)                                     │
//! │  ├── CoreError        - Config parsing failures                         │
//! │  └── ValidationError  - A single broken rule in the policy tables       │
//! │                        (hard error or warning, see Severity)            │
//! │                                                                         │
//! │  bundlecart-store errors (separate crate)                               │
//! │  ├── CartError        - Reference cart mutation failures                │
//! │  └── ConfigError      - Config loading, I/O                             │
//! │                                                                         │
//! │  Decisions themselves never error: a bad rule degrades to "do nothing". │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// Core errors raised while building a policy configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The config document is not valid JSON or has the wrong shape.
    #[error("Invalid policy config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A rule the policy tables break.
///
/// The decision functions stay total even when a config fails validation.
/// Loaders refuse a config with any [`Severity::Error`] finding and only
/// report warnings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required list is empty.
    #[error("{field} is required")]
    Required { field: String },

    /// A product id of zero was found.
    #[error("{field} contains an empty product id")]
    EmptyProductId { field: String },

    /// The same product appears in two tables that must be disjoint.
    #[error("product {product_id} is listed as both {first} and {second}")]
    Overlap {
        product_id: ProductId,
        first: String,
        second: String,
    },

    /// A force-sell map key is not a stand-alone product.
    #[error("force-sell map key {0} is not a stand-alone product")]
    UnknownStandAlone(ProductId),

    /// A force-sell product that the map never attaches to anything.
    #[error("force-sell product {0} is not attached to any stand-alone product")]
    OrphanForceSell(ProductId),

    /// Monetary threshold below zero.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Duplicate value (e.g., a coupon code used by two rules).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

/// How a loader treats a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The tables cannot be used as written.
    Error,
    /// Suspicious but well defined: the policy still behaves predictably.
    Warning,
}

impl ValidationError {
    /// Map keys that are not stand-alone are never read, an explicit
    /// force-sell list stands on its own, and duplicate coupon codes resolve
    /// to the later rule.
    pub fn severity(&self) -> Severity {
        match self {
            ValidationError::UnknownStandAlone(_)
            | ValidationError::OrphanForceSell(_)
            | ValidationError::Duplicate { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
