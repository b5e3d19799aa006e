//! End-to-end hook behavior over the in-memory cart.

use bundlecart_core::upsell::UpsellKind;
use bundlecart_core::{
    CartStore, CartView, LineId, Money, NextUpsell, PolicyConfig, ProductId, RemovalDecision,
    TaxDisplay, UpsellCouponRule,
};
use bundlecart_store::{CartPolicy, MemoryCart, MemoryCatalog, NoticeLog, RenderContext, SharedCart};
use pretty_assertions::assert_eq;
use url::Url;

fn id(raw: u64) -> ProductId {
    ProductId::new(raw)
}

fn line(raw: u64) -> LineId {
    LineId::for_product(id(raw))
}

fn policy() -> CartPolicy {
    CartPolicy::new(PolicyConfig::default())
}

fn cart_page() -> RenderContext {
    RenderContext::cart_page(Url::parse("https://shop.example/cart/").unwrap())
}

/// A cart whose displayed subtotal is `dollars`.
fn cart_worth(dollars: i64) -> MemoryCart {
    let mut cart = MemoryCart::new().with_prices([(id(1), Money::from_major_minor(dollars, 0))]);
    cart.add(id(1), 1).unwrap();
    cart
}

// =============================================================================
// Add
// =============================================================================

#[test]
fn test_stand_alone_without_force_sells_ends_alone() {
    let policy = policy();
    let mut cart = MemoryCart::new();
    cart.add(id(28745), 3).unwrap();
    cart.add(id(42), 1).unwrap();

    policy.add_to_cart(&mut cart, id(29359), 1).unwrap();

    assert_eq!(cart.contents(), vec![(id(29359), 1)]);
}

#[test]
fn test_stand_alone_with_force_sells() {
    let policy = policy();
    let mut cart = MemoryCart::new();
    cart.add(id(28747), 2).unwrap();

    policy.add_to_cart(&mut cart, id(25221), 1).unwrap();

    assert_eq!(
        cart.contents(),
        vec![(id(25221), 1), (id(29234), 1), (id(29444), 1)]
    );
}

#[test]
fn test_force_sells_pinned_to_one_when_readded() {
    let policy = policy();
    let mut cart = MemoryCart::new();
    policy.add_to_cart(&mut cart, id(29237), 1).unwrap();
    cart.set_quantity(&line(25556), 7).unwrap();

    policy.add_to_cart(&mut cart, id(29237), 1).unwrap();

    // Accumulated quantity is discarded: the cart is truncated again
    assert_eq!(cart.contents(), vec![(id(25556), 1), (id(29237), 1)]);
}

#[test]
fn test_force_sells_ignore_requested_quantity() {
    let policy = policy();
    let mut cart = MemoryCart::new();

    policy.add_to_cart(&mut cart, id(25221), 3).unwrap();

    assert_eq!(
        cart.contents(),
        vec![(id(25221), 3), (id(29234), 1), (id(29444), 1)]
    );
}

#[test]
fn test_refused_stand_alone_add_leaves_cart_as_it_was() {
    let policy = policy();
    let mut cart = MemoryCart::new();
    cart.add(id(28745), 1).unwrap();

    assert!(policy.add_to_cart(&mut cart, id(25221), 1000).is_err());

    assert_eq!(cart.contents(), vec![(id(28745), 1)]);
}

#[test]
fn test_switching_stand_alone_products() {
    let policy = policy();
    let mut cart = MemoryCart::new();
    policy.add_to_cart(&mut cart, id(25221), 1).unwrap();

    policy.add_to_cart(&mut cart, id(29237), 1).unwrap();

    assert_eq!(cart.contents(), vec![(id(25556), 1), (id(29237), 1)]);
}

#[test]
fn test_other_product_evicts_bundle_and_keeps_others() {
    let policy = policy();
    let mut cart = MemoryCart::new();
    policy.add_to_cart(&mut cart, id(29237), 1).unwrap();
    cart.add(id(28745), 2).unwrap();

    policy.add_to_cart(&mut cart, id(28746), 1).unwrap();

    assert_eq!(cart.contents(), vec![(id(28745), 2), (id(28746), 1)]);
}

#[test]
fn test_other_products_coexist() {
    let policy = policy();
    let mut cart = MemoryCart::new();

    policy.add_to_cart(&mut cart, id(28745), 1).unwrap();
    policy.add_to_cart(&mut cart, id(28746), 2).unwrap();
    policy.add_to_cart(&mut cart, id(28745), 1).unwrap();

    assert_eq!(cart.contents(), vec![(id(28745), 2), (id(28746), 2)]);
}

#[test]
fn test_unlisted_product_changes_nothing_else() {
    let policy = policy();
    let mut cart = MemoryCart::new();
    policy.add_to_cart(&mut cart, id(25221), 1).unwrap();

    policy.add_to_cart(&mut cart, id(500), 4).unwrap();

    assert_eq!(
        cart.contents(),
        vec![(id(500), 4), (id(25221), 1), (id(29234), 1), (id(29444), 1)]
    );
}

#[test]
fn test_add_hook_never_refuses() {
    let policy = policy();
    let mut cart = MemoryCart::new();

    for product in [25221, 29237, 29359, 28745, 500] {
        assert!(policy.on_add_to_cart(&mut cart, true, id(product), 1));
    }
}

#[test]
fn test_empty_force_sell_map_disables_sorting() {
    let mut config = PolicyConfig::default();
    config.force_sell_map.clear();
    let policy = CartPolicy::new(config);
    let mut cart = MemoryCart::new();
    cart.add(id(28745), 1).unwrap();

    policy.add_to_cart(&mut cart, id(25221), 1).unwrap();

    assert_eq!(cart.contents(), vec![(id(25221), 1), (id(28745), 1)]);
}

// =============================================================================
// Remove
// =============================================================================

#[test]
fn test_removing_stand_alone_empties_cart() {
    let policy = policy();
    let mut cart = MemoryCart::new();
    policy.add_to_cart(&mut cart, id(25221), 1).unwrap();
    cart.add(id(500), 1).unwrap();

    let decision = policy.remove_cart_item(&mut cart, &line(25221)).unwrap();

    assert_eq!(decision, RemovalDecision::ClearCart);
    assert!(cart.is_empty());
}

#[test]
fn test_removing_force_sell_empties_cart() {
    let policy = policy();
    let mut cart = MemoryCart::new();
    policy.add_to_cart(&mut cart, id(25221), 1).unwrap();

    policy.remove_cart_item(&mut cart, &line(29444)).unwrap();

    assert!(cart.is_empty());
}

#[test]
fn test_removing_other_keeps_rest() {
    let policy = policy();
    let mut cart = MemoryCart::new();
    policy.add_to_cart(&mut cart, id(28745), 1).unwrap();
    policy.add_to_cart(&mut cart, id(28746), 3).unwrap();

    let decision = policy.remove_cart_item(&mut cart, &line(28745)).unwrap();

    assert_eq!(decision, RemovalDecision::Keep);
    assert_eq!(cart.contents(), vec![(id(28746), 3)]);
}

#[test]
fn test_add_then_remove_stand_alone_leaves_empty_cart() {
    let policy = policy();

    for stand_alone in [25221, 29237, 29359] {
        let mut cart = MemoryCart::new();
        cart.add(id(28748), 1).unwrap();

        let line_id = policy.add_to_cart(&mut cart, id(stand_alone), 1).unwrap();
        policy.remove_cart_item(&mut cart, &line_id).unwrap();

        assert!(cart.is_empty(), "cart not empty after {}", stand_alone);
    }
}

// =============================================================================
// Render
// =============================================================================

#[test]
fn test_tier_thresholds() {
    let policy = policy();
    let catalog = MemoryCatalog::covering(policy.config());
    let context = cart_page();

    let cases = [(0, None), (6, None), (7, Some(28745)), (196, Some(28745)), (197, Some(29237)), (300, Some(25221))];
    for (dollars, expected) in cases {
        let mut cart = MemoryCart::new();
        if dollars > 0 {
            cart = cart_worth(dollars);
        }
        let mut log = NoticeLog::new();

        let report = policy.before_cart_render(&context, &cart, &catalog, &mut log);

        assert_eq!(
            report.tier.map(|notice| notice.product_id),
            expected.map(id),
            "net total ${}",
            dollars
        );
    }
}

#[test]
fn test_tier_notice_suppressed_when_product_in_cart() {
    let policy = policy();
    let catalog = MemoryCatalog::covering(policy.config());
    let mut cart = cart_worth(300);
    cart.add(id(25221), 1).unwrap();
    let mut log = NoticeLog::new();

    let report = policy.before_cart_render(&cart_page(), &cart, &catalog, &mut log);

    assert!(report.tier.is_none());
    assert!(log.messages().is_empty());
}

#[test]
fn test_discounts_reduce_net_total() {
    let policy = policy();
    let catalog = MemoryCatalog::covering(policy.config());
    let mut cart = cart_worth(200);
    cart.set_discounts(Money::from_major_minor(3, 0), Money::from_major_minor(1, 0));
    let mut log = NoticeLog::new();

    // $197 net excluding tax: level 3
    let report = policy.before_cart_render(&cart_page(), &cart, &catalog, &mut log);
    assert_eq!(report.tier.map(|n| n.product_id), Some(id(29237)));

    // $196 net when prices include tax: level 2
    let cart = cart.with_tax_display(TaxDisplay::Inclusive);
    let report = policy.before_cart_render(&cart_page(), &cart, &catalog, &mut log);
    assert_eq!(report.tier.map(|n| n.product_id), Some(id(28745)));
}

#[test]
fn test_later_coupon_rule_wins() {
    let mut config = PolicyConfig::default();
    config.coupon_upsells.push(UpsellCouponRule {
        coupon_code: "vip".to_string(),
        product_id: id(29359),
        note: "VIP upgrade".to_string(),
        button_label: Some("Go VIP".to_string()),
        next_upsell: None,
    });
    let policy = CartPolicy::new(config);
    let catalog = MemoryCatalog::covering(policy.config());
    let mut cart = MemoryCart::new();
    cart.apply_coupon("vip");
    cart.apply_coupon("Free-Gift");
    let mut log = NoticeLog::new();

    let report = policy.before_cart_render(&cart_page(), &cart, &catalog, &mut log);

    let notice = report.coupon.unwrap();
    assert_eq!(notice.kind, UpsellKind::Coupon);
    assert_eq!(notice.product_id, id(29359));
    assert_eq!(
        log.messages(),
        &["VIP upgrade <a href=\"https://shop.example/cart/?add-to-cart=29359\" class=\"button\">Go VIP</a>".to_string()]
    );
}

#[test]
fn test_tier_and_coupon_both_publish_tier_first() {
    let mut config = PolicyConfig::default();
    config.coupon_upsells[0].next_upsell = Some(NextUpsell {
        coupon_code: "upgrade-10".to_string(),
        product_id: id(0),
    });
    let policy = CartPolicy::new(config);
    let catalog = MemoryCatalog::covering(policy.config());
    let mut cart = cart_worth(10);
    cart.apply_coupon("free-gift");
    let mut log = NoticeLog::new();

    let report = policy.before_cart_render(&cart_page(), &cart, &catalog, &mut log);

    assert_eq!(report.published(), 2);
    let messages = log.drain();
    assert!(messages[0].contains("add-to-cart=28745"));
    assert_eq!(
        messages[1],
        "yaees - Upgrade Today <a href=\"https://shop.example/cart/?apply_coupon=upgrade-10\" class=\"button\">Click Here to Upgrade</a>"
    );
}

#[test]
fn test_label_override_from_config() {
    let mut config = PolicyConfig::default();
    config.default_button_label = "Upgrade now".to_string();
    let policy = CartPolicy::new(config);
    let catalog = MemoryCatalog::covering(policy.config());
    let mut log = NoticeLog::new();

    let report = policy.before_cart_render(&cart_page(), &cart_worth(7), &catalog, &mut log);

    assert_eq!(report.tier.unwrap().button_label, "Upgrade now");
}

// =============================================================================
// Shared Cart
// =============================================================================

#[test]
fn test_concurrent_adds_on_one_session() {
    let policy = policy();
    let shared = SharedCart::default();

    std::thread::scope(|scope| {
        for product in [25221u64, 28745, 29237, 28746] {
            let shared = shared.clone();
            let policy = &policy;
            scope.spawn(move || {
                shared
                    .with_cart_mut(|cart| policy.add_to_cart(cart, id(product), 1))
                    .unwrap();
            });
        }
    });

    // Whatever the order, no stand-alone product shares the cart with an
    // "other" product, and a stand-alone product always has its force-sells
    shared.with_cart(|cart| {
        let config = policy.config();
        let products: Vec<ProductId> = cart.items().iter().map(|item| item.product_id).collect();
        let has_stand_alone = products.iter().any(|p| config.is_stand_alone(*p));
        let has_other = products.iter().any(|p| config.is_other(*p));
        assert!(!(has_stand_alone && has_other), "mixed cart: {:?}", products);
        for product in &products {
            for force_sell in config.force_sells_for(*product) {
                assert!(cart.contains_product(*force_sell));
            }
        }
    });
}
