//! # Policy Configuration
//!
//! The static tables that drive every decision. A [`PolicyConfig`] is built
//! once at startup (from defaults or a JSON document) and then only borrowed.
//!
//! ## Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  standAloneProducts   [25221, 29237, 29359]   must be alone in the cart │
//! │  otherProducts        [28745, 28746, ...]     fine together, never with │
//! │                                               a stand-alone product     │
//! │  forceSellMap         29237 → [25556]         add-ons pinned at qty 1   │
//! │                       25221 → [29234, 29444]                            │
//! │  forceSellProducts    [25556, 29234, 29444]   removal empties the cart  │
//! │  tierUpsells          $7 / $197 / $297        highest qualifying wins   │
//! │  couponUpsells        free-gift → 226         last matching wins        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::ProductId;
use crate::DEFAULT_BUTTON_LABEL;

// =============================================================================
// Upsell Rules
// =============================================================================

/// Price-threshold upsell: shown once the net cart total reaches `min_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellTierRule {
    /// Informational tier number; selection ignores it.
    pub level: u32,

    /// Net cart total (in cents) at which the rule qualifies.
    pub min_total: Money,

    /// Product the shopper is invited to add.
    pub product_id: ProductId,

    /// Message shown before the link.
    pub note: String,

    #[serde(default)]
    pub button_label: Option<String>,
}

/// Secondary offer a coupon rule links to instead of its own product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextUpsell {
    #[serde(default)]
    pub coupon_code: String,

    #[serde(default = "empty_product")]
    pub product_id: ProductId,
}

impl NextUpsell {
    /// A next upsell counts only with a coupon code or a real product.
    pub fn is_populated(&self) -> bool {
        !self.coupon_code.trim().is_empty() || !self.product_id.is_empty()
    }
}

/// Coupon upsell: shown while `coupon_code` is applied to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsellCouponRule {
    pub coupon_code: String,

    pub product_id: ProductId,

    pub note: String,

    #[serde(default)]
    pub button_label: Option<String>,

    #[serde(default)]
    pub next_upsell: Option<NextUpsell>,
}

/// Picks the rule's label, or the fallback when it is missing or blank.
pub(crate) fn resolve_label<'a>(label: Option<&'a str>, fallback: &'a str) -> &'a str {
    match label {
        Some(label) if !label.trim().is_empty() => label,
        _ => fallback,
    }
}

fn empty_product() -> ProductId {
    ProductId::new(0)
}

fn default_button_label() -> String {
    DEFAULT_BUTTON_LABEL.to_string()
}

// =============================================================================
// Policy Config
// =============================================================================

/// Immutable cart policy tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    /// Products that must be alone in the cart (besides their force-sells).
    pub stand_alone_products: Vec<ProductId>,

    /// Products that may share the cart with each other only.
    #[serde(default)]
    pub other_products: Vec<ProductId>,

    /// Stand-alone product → force-sell products, in add order.
    #[serde(default)]
    pub force_sell_map: BTreeMap<ProductId, Vec<ProductId>>,

    /// Products whose removal empties the cart. Derived from the map when empty.
    #[serde(default)]
    pub force_sell_products: Vec<ProductId>,

    #[serde(default)]
    pub tier_upsells: Vec<UpsellTierRule>,

    #[serde(default)]
    pub coupon_upsells: Vec<UpsellCouponRule>,

    /// Link label for rules without one.
    #[serde(default = "default_button_label")]
    pub default_button_label: String,
}

impl PolicyConfig {
    /// Parses a JSON policy document.
    ///
    /// ## Example
    /// ```rust
    /// use bundlecart_core::{PolicyConfig, ProductId};
    ///
    /// let config = PolicyConfig::from_json(r#"{
    ///     "standAloneProducts": [10],
    ///     "forceSellMap": { "10": [11, 12] }
    /// }"#).unwrap();
    ///
    /// assert!(config.is_force_sell(ProductId::new(12)));
    /// ```
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the tables back to pretty JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_stand_alone(&self, product_id: ProductId) -> bool {
        self.stand_alone_products.contains(&product_id)
    }

    pub fn is_other(&self, product_id: ProductId) -> bool {
        self.other_products.contains(&product_id)
    }

    /// Whether removing this product empties the cart.
    pub fn is_force_sell(&self, product_id: ProductId) -> bool {
        if self.force_sell_products.is_empty() {
            self.force_sell_map.values().any(|ids| ids.contains(&product_id))
        } else {
            self.force_sell_products.contains(&product_id)
        }
    }

    /// Force-sells attached to a stand-alone product (empty when unmapped).
    pub fn force_sells_for(&self, product_id: ProductId) -> &[ProductId] {
        self.force_sell_map
            .get(&product_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Explicit force-sell list, or every product the map attaches.
    pub fn effective_force_sell_products(&self) -> Vec<ProductId> {
        if !self.force_sell_products.is_empty() {
            return self.force_sell_products.clone();
        }
        let mut ids: Vec<ProductId> = Vec::new();
        for id in self.force_sell_map.values().flatten() {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    /// Label used for a rule's link.
    pub fn button_label<'a>(&'a self, label: Option<&'a str>) -> &'a str {
        resolve_label(
            label,
            resolve_label(Some(self.default_button_label.as_str()), DEFAULT_BUTTON_LABEL),
        )
    }
}

impl Default for PolicyConfig {
    /// The storefront's launch tables.
    fn default() -> Self {
        let ids = |raw: &[u64]| raw.iter().copied().map(ProductId::new).collect::<Vec<_>>();

        let mut force_sell_map = BTreeMap::new();
        force_sell_map.insert(ProductId::new(29237), ids(&[25556]));
        force_sell_map.insert(ProductId::new(25221), ids(&[29234, 29444]));

        PolicyConfig {
            stand_alone_products: ids(&[25221, 29237, 29359]),
            other_products: ids(&[28745, 28746, 28747, 28748]),
            force_sell_map,
            force_sell_products: ids(&[25556, 29234, 29444]),
            tier_upsells: vec![
                UpsellTierRule {
                    level: 2,
                    min_total: Money::from_major_minor(7, 0),
                    product_id: ProductId::new(28745),
                    note: "Massive Value! Get Your Diabetes Under Better Control By Learning About Healthy Nutrition with Diabetes - Upgrade Today".to_string(),
                    button_label: None,
                },
                UpsellTierRule {
                    level: 3,
                    min_total: Money::from_major_minor(197, 0),
                    product_id: ProductId::new(29237),
                    note: "Get The Full Benefits Of Diabetes Education By Upgrading To The Diabetes Education Program for $297 + $14.99/month! (Great Value!)".to_string(),
                    button_label: None,
                },
                UpsellTierRule {
                    level: 4,
                    min_total: Money::from_major_minor(297, 0),
                    product_id: ProductId::new(25221),
                    note: "Join The ELITE 3% Group By Upgrading To The 3% Diabetes Program Today for $397 + $19.99/month. (Best Value!)".to_string(),
                    button_label: None,
                },
            ],
            coupon_upsells: vec![UpsellCouponRule {
                coupon_code: "free-gift".to_string(),
                product_id: ProductId::new(226),
                note: "yaees - Upgrade Today".to_string(),
                button_label: None,
                next_upsell: Some(NextUpsell::default()),
            }],
            default_button_label: default_button_label(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_tables() {
        let config = PolicyConfig::default();
        assert!(config.is_stand_alone(ProductId::new(29359)));
        assert!(config.is_other(ProductId::new(28748)));
        assert!(config.is_force_sell(ProductId::new(29444)));
        assert_eq!(
            config.force_sells_for(ProductId::new(25221)),
            &[ProductId::new(29234), ProductId::new(29444)]
        );
        assert!(config.force_sells_for(ProductId::new(29359)).is_empty());
    }

    #[test]
    fn test_force_sells_derived_from_map_when_unlisted() {
        let mut config = PolicyConfig::default();
        config.force_sell_products.clear();
        assert!(config.is_force_sell(ProductId::new(25556)));
        assert!(!config.is_force_sell(ProductId::new(28745)));
        assert_eq!(
            config.effective_force_sell_products(),
            vec![ProductId::new(29234), ProductId::new(29444), ProductId::new(25556)]
        );
    }

    #[test]
    fn test_from_json_minimal() {
        let config = PolicyConfig::from_json(
            r#"{
                "standAloneProducts": [1],
                "forceSellMap": { "1": [2] },
                "tierUpsells": [
                    { "level": 1, "minTotal": 500, "productId": 3, "note": "More?" }
                ],
                "couponUpsells": [
                    { "couponCode": "vip", "productId": 4, "note": "VIP deal",
                      "nextUpsell": { "couponCode": "vip2" } }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.force_sells_for(ProductId::new(1)), &[ProductId::new(2)]);
        assert_eq!(config.tier_upsells[0].min_total, Money::from_cents(500));
        let next = config.coupon_upsells[0].next_upsell.as_ref().unwrap();
        assert_eq!(next.product_id, ProductId::new(0));
        assert!(next.is_populated());
        assert_eq!(config.default_button_label, DEFAULT_BUTTON_LABEL);
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let config = PolicyConfig::default();
        let json = config.to_json().unwrap();
        assert_eq!(PolicyConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        assert!(PolicyConfig::from_json(r#"{ "standAloneProducts": 12 }"#).is_err());
    }

    #[test]
    fn test_button_label_fallbacks() {
        let mut config = PolicyConfig::default();
        assert_eq!(config.button_label(Some("Add it")), "Add it");
        assert_eq!(config.button_label(Some("  ")), DEFAULT_BUTTON_LABEL);
        assert_eq!(config.button_label(None), DEFAULT_BUTTON_LABEL);

        config.default_button_label = "Upgrade".to_string();
        assert_eq!(config.button_label(None), "Upgrade");

        config.default_button_label.clear();
        assert_eq!(config.button_label(None), DEFAULT_BUTTON_LABEL);
    }

    #[test]
    fn test_next_upsell_population() {
        assert!(!NextUpsell::default().is_populated());
        assert!(NextUpsell { coupon_code: String::new(), product_id: ProductId::new(9) }.is_populated());
    }
}
