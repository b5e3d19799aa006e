//! # Validation Module
//!
//! Consistency checks for policy tables.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Validation Runs                              │
//! │                                                                         │
//! │  Layer 1: Config loader (bundlecart-store)                              │
//! │  ├── JSON shape (serde)                                                 │
//! │  └── THIS MODULE: table consistency                                     │
//! │      ├── errors refuse the config                                       │
//! │      └── warnings are logged, the config still loads                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Decisions (policy, upsell)                                    │
//! │  └── Never fail: a rule that cannot apply does nothing                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bundlecart_core::validation::validate_policy;
//! use bundlecart_core::PolicyConfig;
//!
//! assert!(validate_policy(&PolicyConfig::default()).is_ok());
//! ```

use crate::config::PolicyConfig;
use crate::error::{Severity, ValidationError};
use crate::types::ProductId;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Entry Points
// =============================================================================

/// Validates the whole config, returning the first hard error found.
///
/// Warnings never fail validation; see [`collect_warnings`].
pub fn validate_policy(config: &PolicyConfig) -> ValidationResult<()> {
    match collect_findings(config)
        .into_iter()
        .find(|finding| finding.severity() == Severity::Error)
    {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Findings that do not stop the config from loading.
pub fn collect_warnings(config: &PolicyConfig) -> Vec<ValidationError> {
    collect_findings(config)
        .into_iter()
        .filter(ValidationError::is_warning)
        .collect()
}

/// Every problem in the config, errors and warnings, in table order.
pub fn collect_findings(config: &PolicyConfig) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    let force_sells = config.effective_force_sell_products();

    if config.stand_alone_products.is_empty() {
        findings.push(ValidationError::Required {
            field: "standAloneProducts".to_string(),
        });
    }

    let tables: [(&str, &[ProductId]); 3] = [
        ("standAloneProducts", config.stand_alone_products.as_slice()),
        ("otherProducts", config.other_products.as_slice()),
        ("forceSellProducts", force_sells.as_slice()),
    ];
    for (field, ids) in tables {
        if let Err(err) = validate_product_ids(field, ids) {
            findings.push(err);
        }
    }
    findings.extend(find_overlaps(&tables));

    for (stand_alone, attached) in &config.force_sell_map {
        if !config.is_stand_alone(*stand_alone) {
            findings.push(ValidationError::UnknownStandAlone(*stand_alone));
        }
        if let Err(err) = validate_product_ids("forceSellMap", attached) {
            findings.push(err);
        }
    }

    for product_id in &config.force_sell_products {
        let attached = config
            .force_sell_map
            .values()
            .any(|ids| ids.contains(product_id));
        if !attached {
            findings.push(ValidationError::OrphanForceSell(*product_id));
        }
    }

    for rule in &config.tier_upsells {
        let field = format!("tierUpsells[level {}]", rule.level);
        if rule.min_total.is_negative() {
            findings.push(ValidationError::Negative {
                field: format!("{}.minTotal", field),
            });
        }
        if rule.product_id.is_empty() {
            findings.push(ValidationError::EmptyProductId { field: field.clone() });
        }
        if let Err(err) = validate_note(&field, &rule.note) {
            findings.push(err);
        }
    }

    let mut seen_codes: Vec<String> = Vec::new();
    for (index, rule) in config.coupon_upsells.iter().enumerate() {
        let field = format!("couponUpsells[{}]", index);
        let code = rule.coupon_code.trim().to_lowercase();
        if code.is_empty() {
            findings.push(ValidationError::Required {
                field: format!("{}.couponCode", field),
            });
        } else if seen_codes.contains(&code) {
            findings.push(ValidationError::Duplicate {
                field: "couponCode".to_string(),
                value: rule.coupon_code.clone(),
            });
        } else {
            seen_codes.push(code);
        }
        if rule.product_id.is_empty() {
            findings.push(ValidationError::EmptyProductId { field: field.clone() });
        }
        if let Err(err) = validate_note(&field, &rule.note) {
            findings.push(err);
        }
    }

    findings
}

// =============================================================================
// Field Validators
// =============================================================================

/// Rejects zero ids in a product table.
///
/// ## Example
/// ```rust
/// use bundlecart_core::validation::validate_product_ids;
/// use bundlecart_core::ProductId;
///
/// assert!(validate_product_ids("otherProducts", &[ProductId::new(1)]).is_ok());
/// assert!(validate_product_ids("otherProducts", &[ProductId::new(0)]).is_err());
/// ```
pub fn validate_product_ids(field: &str, ids: &[ProductId]) -> ValidationResult<()> {
    if ids.iter().any(ProductId::is_empty) {
        return Err(ValidationError::EmptyProductId {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// An upsell note must say something.
pub fn validate_note(field: &str, note: &str) -> ValidationResult<()> {
    if note.trim().is_empty() {
        return Err(ValidationError::Required {
            field: format!("{}.note", field),
        });
    }
    Ok(())
}

/// Stand-alone, other, and force-sell products must be disjoint.
fn find_overlaps(tables: &[(&str, &[ProductId]); 3]) -> Vec<ValidationError> {
    let mut overlaps = Vec::new();
    for (i, (first, first_ids)) in tables.iter().enumerate() {
        for (second, second_ids) in &tables[i + 1..] {
            for product_id in first_ids.iter().filter(|id| second_ids.contains(*id)) {
                overlaps.push(ValidationError::Overlap {
                    product_id: *product_id,
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
    }
    overlaps
}

impl PolicyConfig {
    /// Validates the tables. See [`validate_policy`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_policy(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn id(raw: u64) -> ProductId {
        ProductId::new(raw)
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(collect_findings(&PolicyConfig::default()).is_empty());
        assert!(PolicyConfig::default().validate().is_ok());
    }

    #[test]
    fn test_requires_stand_alone_products() {
        let mut config = PolicyConfig::default();
        config.stand_alone_products.clear();
        config.force_sell_map.clear();
        config.force_sell_products.clear();

        assert_eq!(
            validate_policy(&config),
            Err(ValidationError::Required {
                field: "standAloneProducts".to_string()
            })
        );
    }

    #[test]
    fn test_detects_overlap() {
        let mut config = PolicyConfig::default();
        config.other_products.push(id(29237));

        assert!(collect_findings(&config).contains(&ValidationError::Overlap {
            product_id: id(29237),
            first: "standAloneProducts".to_string(),
            second: "otherProducts".to_string(),
        }));
    }

    #[test]
    fn test_detects_unknown_map_key_and_orphan() {
        let mut config = PolicyConfig::default();
        config.force_sell_map.insert(id(1), vec![id(2)]);
        config.force_sell_products.push(id(3));

        let findings = collect_findings(&config);
        assert!(findings.contains(&ValidationError::UnknownStandAlone(id(1))));
        assert!(findings.contains(&ValidationError::OrphanForceSell(id(3))));

        // Both are warnings: the config still validates
        assert_eq!(collect_warnings(&config).len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_coupon_code_is_a_warning() {
        let mut config = PolicyConfig::default();
        let mut twin = config.coupon_upsells[0].clone();
        twin.product_id = id(28745);
        config.coupon_upsells.push(twin);

        assert_eq!(
            collect_warnings(&config),
            vec![ValidationError::Duplicate {
                field: "couponCode".to_string(),
                value: "free-gift".to_string()
            }]
        );
        assert!(validate_policy(&config).is_ok());
    }

    #[test]
    fn test_error_reported_before_warnings() {
        let mut config = PolicyConfig::default();
        config.force_sell_map.insert(id(1), vec![id(2)]);
        config.other_products.push(id(0));

        assert_eq!(
            validate_policy(&config),
            Err(ValidationError::EmptyProductId {
                field: "otherProducts".to_string()
            })
        );
    }

    #[test]
    fn test_detects_bad_rules() {
        let mut config = PolicyConfig::default();
        config.tier_upsells[0].min_total = Money::from_cents(-1);
        config.tier_upsells[1].note = "  ".to_string();
        let mut twin = config.coupon_upsells[0].clone();
        twin.coupon_code = "FREE-GIFT".to_string();
        config.coupon_upsells.push(twin);

        let findings = collect_findings(&config);
        assert!(findings.contains(&ValidationError::Negative {
            field: "tierUpsells[level 2].minTotal".to_string()
        }));
        assert!(findings.contains(&ValidationError::Required {
            field: "tierUpsells[level 3].note".to_string()
        }));
        assert!(findings.contains(&ValidationError::Duplicate {
            field: "couponCode".to_string(),
            value: "FREE-GIFT".to_string()
        }));
    }

    #[test]
    fn test_detects_empty_ids() {
        let mut config = PolicyConfig::default();
        config.other_products.push(id(0));
        config.coupon_upsells[0].product_id = id(0);

        let findings = collect_findings(&config);
        assert!(findings.contains(&ValidationError::EmptyProductId {
            field: "otherProducts".to_string()
        }));
        assert!(findings.contains(&ValidationError::EmptyProductId {
            field: "couponUpsells[0]".to_string()
        }));
    }
}
