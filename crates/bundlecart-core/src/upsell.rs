//! # Upsell Selection
//!
//! Picks at most one price-tier upsell and at most one coupon upsell for the
//! cart page.
//!
//! ## Selection Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TIER (by net total)                 COUPON (by applied codes)          │
//! │  ───────────────────────             ─────────────────────────          │
//! │  net = subtotal - discount           scan rules in order                │
//! │        (- discount tax if            every rule whose code is applied   │
//! │         prices include tax)          replaces the previous match        │
//! │                                      → LAST match wins                  │
//! │  best starts at $0                                                      │
//! │  rule wins if net ≥ min              populated next_upsell redirects    │
//! │          and best < min             the link to the next offer         │
//! │  → HIGHEST threshold wins,                                              │
//! │    first one on a tie                                                   │
//! │                                                                         │
//! │  Both: product already in cart → no notice                              │
//! │        product not in catalog  → no notice                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use url::Url;

use crate::cart::{CartView, ProductCatalog};
use crate::config::{PolicyConfig, UpsellCouponRule, UpsellTierRule};
use crate::money::Money;
use crate::types::ProductId;
use crate::{ADD_TO_CART_ARG, APPLY_COUPON_ARG};

// =============================================================================
// Notice Types
// =============================================================================

/// Which rule list produced a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UpsellKind {
    Tier,
    Coupon,
}

/// Query arguments of an upsell button.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpsellLink {
    pub add_to_cart: Option<ProductId>,
    pub apply_coupon: Option<String>,
}

impl UpsellLink {
    pub fn add_to_cart(product_id: ProductId) -> Self {
        UpsellLink {
            add_to_cart: Some(product_id),
            apply_coupon: None,
        }
    }

    /// Appends the arguments to the current page URL, replacing earlier ones.
    ///
    /// ## Example
    /// ```rust
    /// use bundlecart_core::{ProductId, UpsellLink};
    /// use url::Url;
    ///
    /// let page = Url::parse("https://shop.example/cart/?add-to-cart=1&utm=mail").unwrap();
    /// let link = UpsellLink::add_to_cart(ProductId::new(28745)).to_url(&page);
    /// assert_eq!(link.as_str(), "https://shop.example/cart/?utm=mail&add-to-cart=28745");
    /// ```
    pub fn to_url(&self, page_url: &Url) -> Url {
        let mut url = page_url.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != ADD_TO_CART_ARG && key != APPLY_COUPON_ARG)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in &kept {
                pairs.append_pair(key, value);
            }
            if let Some(product_id) = self.add_to_cart {
                pairs.append_pair(ADD_TO_CART_ARG, &product_id.to_string());
            }
            if let Some(code) = &self.apply_coupon {
                pairs.append_pair(APPLY_COUPON_ARG, code);
            }
        }

        if url.query() == Some("") {
            url.set_query(None);
        }
        url
    }
}

/// A selected upsell, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpsellNotice {
    pub kind: UpsellKind,
    /// Product whose rule fired (not necessarily the link target).
    pub product_id: ProductId,
    pub note: String,
    pub link: UpsellLink,
    pub button_label: String,
}

impl UpsellNotice {
    /// Renders `"{note} <a href=\"{url}\" class=\"button\">{label}</a>"`.
    ///
    /// Notes and labels are trusted config and may carry markup; only the
    /// URL is escaped.
    pub fn render(&self, page_url: &Url) -> String {
        let href = self.link.to_url(page_url);
        format!(
            "{} <a href=\"{}\" class=\"button\">{}</a>",
            self.note,
            escape_attr(href.as_str()),
            self.button_label
        )
    }
}

fn escape_attr(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// =============================================================================
// Net Total
// =============================================================================

/// Cart total the tier rules are compared against.
///
/// ## Example
/// ```rust
/// use bundlecart_core::{net_total, CartSnapshot, Money, TaxDisplay};
///
/// let cart = CartSnapshot::new()
///     .with_totals(Money::from_cents(11000), Money::from_cents(1000), Money::from_cents(100))
///     .with_tax_display(TaxDisplay::Inclusive);
/// assert_eq!(net_total(&cart), Money::from_cents(9900));
/// ```
pub fn net_total(cart: &impl CartView) -> Money {
    let mut total = cart.displayed_subtotal() - cart.discount_total();
    if cart.prices_include_tax() {
        total -= cart.discount_tax();
    }
    total
}

// =============================================================================
// Tier Upsell
// =============================================================================

/// Highest-threshold rule the net total qualifies for.
///
/// The running best starts at zero and only a strictly larger threshold
/// replaces it, so a `$0` rule never fires and the first of two equal
/// thresholds wins.
pub fn select_tier_rule(rules: &[UpsellTierRule], net_total: Money) -> Option<&UpsellTierRule> {
    let mut best = Money::zero();
    let mut selected = None;
    for rule in rules {
        if net_total >= rule.min_total && best < rule.min_total {
            best = rule.min_total;
            selected = Some(rule);
        }
    }
    selected
}

/// Tier upsell for the cart, if any.
pub fn tier_upsell(
    cart: &impl CartView,
    catalog: &impl ProductCatalog,
    config: &PolicyConfig,
) -> Option<UpsellNotice> {
    let rule = select_tier_rule(&config.tier_upsells, net_total(cart))?;
    if !offerable(rule.product_id, cart, catalog) {
        return None;
    }

    Some(UpsellNotice {
        kind: UpsellKind::Tier,
        product_id: rule.product_id,
        note: rule.note.clone(),
        link: UpsellLink::add_to_cart(rule.product_id),
        button_label: config.button_label(rule.button_label.as_deref()).to_string(),
    })
}

// =============================================================================
// Coupon Upsell
// =============================================================================

/// Last rule whose coupon is applied to the cart.
pub fn select_coupon_rule<'a>(
    rules: &'a [UpsellCouponRule],
    cart: &impl CartView,
) -> Option<&'a UpsellCouponRule> {
    rules
        .iter()
        .filter(|rule| cart.has_discount(&rule.coupon_code))
        .last()
}

/// Coupon upsell for the cart, if any.
///
/// A populated `next_upsell` redirects the link: its product is added when it
/// exists (the argument is dropped otherwise) and its coupon is applied.
pub fn coupon_upsell(
    cart: &impl CartView,
    catalog: &impl ProductCatalog,
    config: &PolicyConfig,
) -> Option<UpsellNotice> {
    let rule = select_coupon_rule(&config.coupon_upsells, cart)?;
    if !offerable(rule.product_id, cart, catalog) {
        return None;
    }

    let mut link = UpsellLink::add_to_cart(rule.product_id);
    if let Some(next) = rule.next_upsell.as_ref().filter(|next| next.is_populated()) {
        link.add_to_cart = catalog.exists(next.product_id).then_some(next.product_id);
        let code = next.coupon_code.trim();
        link.apply_coupon = (!code.is_empty()).then(|| code.to_string());
    }

    Some(UpsellNotice {
        kind: UpsellKind::Coupon,
        product_id: rule.product_id,
        note: rule.note.clone(),
        link,
        button_label: config.button_label(rule.button_label.as_deref()).to_string(),
    })
}

/// A product can be offered when it exists and is not in the cart yet.
fn offerable(product_id: ProductId, cart: &impl CartView, catalog: &impl ProductCatalog) -> bool {
    !cart.contains_product(product_id) && catalog.exists(product_id)
}

// =============================================================================
// Unit Tests
// =============================================================================
