//! # Policy Checker
//!
//! Validates a policy file before it goes live and previews what it does.
//! Exits non-zero when the policy has errors; warnings are only printed.
//!
//! ## Usage
//! ```bash
//! # Check the built-in tables (or the file named by BUNDLECART_CONFIG)
//! cargo run -p bundlecart-store --bin policy-check
//!
//! # Check a specific file
//! cargo run -p bundlecart-store --bin policy-check -- --config ./policy.json
//!
//! # Preview the upsells for a $250 cart with the free-gift coupon
//! cargo run -p bundlecart-store --bin policy-check -- --total 250 --coupon free-gift
//!
//! # Preview what adding a product does to an empty cart
//! cargo run -p bundlecart-store --bin policy-check -- --add 25221
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use bundlecart_core::validation::collect_findings;
use bundlecart_core::{CartSnapshot, CartView, Money, PolicyConfig, ProductId, ValidationError};
use bundlecart_store::logging::init_tracing;
use bundlecart_store::{CartPolicy, MemoryCart, MemoryCatalog, NoticeLog, RenderContext, StoreConfig};
use tracing::error;
use url::Url;

const PREVIEW_PAGE: &str = "https://shop.example/cart/";

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    total: Option<Money>,
    coupons: Vec<String>,
    add: Vec<ProductId>,
    dump: bool,
}

fn main() -> ExitCode {
    init_tracing();

    let options = match parse_args(env::args().skip(1).collect()) {
        Ok(Some(options)) => options,
        Ok(None) => return ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(options) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Policy check failed");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{} needs a value", flag));
        match arg.as_str() {
            "--config" | "-c" => options.config = Some(PathBuf::from(value("--config")?)),
            "--total" | "-t" => {
                let raw = value("--total")?;
                options.total = Some(parse_amount(&raw).ok_or_else(|| format!("Invalid amount: {}", raw))?);
            }
            "--coupon" => options.coupons.push(value("--coupon")?),
            "--add" | "-a" => {
                let raw = value("--add")?;
                options.add.push(raw.parse().map_err(|_| format!("Invalid product id: {}", raw))?);
            }
            "--dump" => options.dump = true,
            "--help" | "-h" => {
                println!("Bundlecart Policy Checker");
                println!();
                println!("Usage: policy-check [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>   Policy JSON file (default: $BUNDLECART_CONFIG or built-in)");
                println!("  -t, --total <AMOUNT>  Preview upsells for this cart total, e.g. 197.50");
                println!("      --coupon <CODE>   Coupon applied to the preview cart (repeatable)");
                println!("  -a, --add <ID>        Preview adding a product (repeatable, in order)");
                println!("      --dump            Print the effective policy as JSON");
                println!("  -h, --help            Show this help message");
                return Ok(None);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(Some(options))
}

/// Parses `"297"`, `"197.5"` or `"197.50"` into money.
fn parse_amount(raw: &str) -> Option<Money> {
    let raw = raw.trim();
    let (major, minor) = raw.split_once('.').unwrap_or((raw, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if major.is_empty() || !digits(major) || !digits(minor) || minor.len() > 2 {
        return None;
    }

    let major: i64 = major.parse().ok()?;
    let minor: i64 = match minor.len() {
        0 => 0,
        1 => minor.parse::<i64>().ok()? * 10,
        _ => minor.parse().ok()?,
    };
    Some(Money::from_major_minor(major, minor))
}

fn run(options: Options) -> Result<bool, Box<dyn std::error::Error>> {
    let mut store_config = StoreConfig::load()?;
    if options.config.is_some() {
        store_config.policy_path = options.config.clone();
    }

    let policy = store_config.read_policy()?;
    let (warnings, errors): (Vec<ValidationError>, Vec<ValidationError>) = collect_findings(&policy)
        .into_iter()
        .partition(ValidationError::is_warning);

    println!("Bundlecart Policy Check");
    println!("=======================");
    match &store_config.policy_path {
        Some(path) => println!("Policy: {}", path.display()),
        None => println!("Policy: built-in tables"),
    }
    print_summary(&policy);
    println!();

    if errors.is_empty() {
        println!("✓ No errors found");
    } else {
        println!("✗ {} error(s):", errors.len());
        for finding in &errors {
            println!("  - {}", finding);
        }
    }
    if !warnings.is_empty() {
        println!("! {} warning(s):", warnings.len());
        for finding in &warnings {
            println!("  - {}", finding);
        }
    }

    if options.dump {
        println!();
        println!("{}", policy.to_json()?);
    }

    let cart_policy = CartPolicy::new(policy).with_cart_page_only(store_config.cart_page_only);

    if !options.add.is_empty() {
        preview_adds(&cart_policy, &options.add);
    }

    if options.total.is_some() || !options.coupons.is_empty() {
        preview_upsells(&cart_policy, options.total.unwrap_or_default(), &options.coupons)?;
    }

    Ok(errors.is_empty())
}

fn print_summary(policy: &PolicyConfig) {
    println!("Stand-alone products: {}", policy.stand_alone_products.len());
    println!("Other products:       {}", policy.other_products.len());
    println!("Force-sell products:  {}", policy.effective_force_sell_products().len());
    println!("Tier upsells:         {}", policy.tier_upsells.len());
    println!("Coupon upsells:       {}", policy.coupon_upsells.len());
}

fn preview_adds(cart_policy: &CartPolicy, products: &[ProductId]) {
    println!();
    println!("Add preview:");
    let mut cart = MemoryCart::new();
    for &product_id in products {
        if let Err(e) = cart_policy.add_to_cart(&mut cart, product_id, 1) {
            println!("  add {} failed: {}", product_id, e);
            continue;
        }
        let contents: Vec<String> = cart
            .contents()
            .iter()
            .map(|(id, qty)| format!("{} x{}", id, qty))
            .collect();
        println!("  add {} -> {{ {} }}", product_id, contents.join(", "));
    }
}

fn preview_upsells(
    cart_policy: &CartPolicy,
    total: Money,
    coupons: &[String],
) -> Result<(), url::ParseError> {
    let cart = coupons
        .iter()
        .fold(CartSnapshot::new(), |cart, code| cart.with_coupon(code.to_lowercase()))
        .with_totals(total, Money::zero(), Money::zero());
    let catalog = MemoryCatalog::covering(cart_policy.config());
    let mut log = NoticeLog::new();
    let context = RenderContext::cart_page(Url::parse(PREVIEW_PAGE)?);

    let report = cart_policy.before_cart_render(&context, &cart, &catalog, &mut log);

    println!();
    println!(
        "Upsell preview for {} with coupons [{}]:",
        total,
        cart.active_discount_codes().join(", ")
    );
    if report.published() == 0 {
        println!("  (no notices)");
    }
    for message in log.drain() {
        println!("  {}", message);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("297"), Some(Money::from_cents(29700)));
        assert_eq!(parse_amount("197.50"), Some(Money::from_cents(19750)));
        assert_eq!(parse_amount("197.5"), Some(Money::from_cents(19750)));
        assert_eq!(parse_amount("7.05"), Some(Money::from_cents(705)));
        assert_eq!(parse_amount("1.234"), None);
        assert_eq!(parse_amount("-3"), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(args(&["--total", "250", "--coupon", "free-gift", "-a", "25221"]))
            .unwrap()
            .unwrap();
        assert_eq!(options.total, Some(Money::from_cents(25000)));
        assert_eq!(options.coupons, vec!["free-gift".to_string()]);
        assert_eq!(options.add, vec![ProductId::new(25221)]);

        assert!(parse_args(args(&["--help"])).unwrap().is_none());
        assert!(parse_args(args(&["--total"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
    }
}
