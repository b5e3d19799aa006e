//! Store configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. The policy tables live in a JSON file named by
//! `BUNDLECART_CONFIG`; without one the built-in tables are used.

use std::env;
use std::fs;
use std::path::PathBuf;

use bundlecart_core::validation::collect_findings;
use bundlecart_core::{PolicyConfig, Severity};
use tracing::{debug, info, warn};

use crate::error::ConfigError;

/// Env var naming the policy JSON file.
pub const CONFIG_PATH_VAR: &str = "BUNDLECART_CONFIG";

/// Env var overriding the fallback button label.
pub const BUTTON_LABEL_VAR: &str = "BUNDLECART_DEFAULT_BUTTON_LABEL";

/// Env var gating upsell rendering to the cart page.
pub const CART_PAGE_ONLY_VAR: &str = "BUNDLECART_CART_PAGE_ONLY";

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Policy JSON file (built-in tables when unset)
    pub policy_path: Option<PathBuf>,

    /// Replaces the policy's fallback button label
    pub default_button_label: Option<String>,

    /// Only show upsells on the cart page (default: true)
    pub cart_page_only: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            policy_path: None,
            default_button_label: None,
            cart_page_only: true,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup.
    ///
    /// ## Example
    /// ```rust
    /// use bundlecart_store::StoreConfig;
    ///
    /// let config = StoreConfig::from_lookup(|key| match key {
    ///     "BUNDLECART_CART_PAGE_ONLY" => Some("false".to_string()),
    ///     _ => None,
    /// })
    /// .unwrap();
    /// assert!(!config.cart_page_only);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = StoreConfig {
            policy_path: non_blank(CONFIG_PATH_VAR).map(PathBuf::from),

            default_button_label: non_blank(BUTTON_LABEL_VAR),

            cart_page_only: match non_blank(CART_PAGE_ONLY_VAR) {
                Some(raw) => parse_flag(&raw)
                    .ok_or_else(|| ConfigError::InvalidValue(CART_PAGE_ONLY_VAR.to_string()))?,
                None => true,
            },
        };

        Ok(config)
    }

    /// Reads, overrides, and validates the policy tables.
    ///
    /// The first hard error refuses the policy. Warnings are logged.
    pub fn load_policy(&self) -> Result<PolicyConfig, ConfigError> {
        let policy = self.read_policy()?;
        for finding in collect_findings(&policy) {
            match finding.severity() {
                Severity::Error => return Err(ConfigError::Invalid(finding)),
                Severity::Warning => warn!(finding = %finding, "Policy config warning"),
            }
        }
        Ok(policy)
    }

    /// Reads the policy tables and applies the label override, unvalidated.
    pub fn read_policy(&self) -> Result<PolicyConfig, ConfigError> {
        let mut policy = match &self.policy_path {
            Some(path) => {
                let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                let policy =
                    PolicyConfig::from_json(&json).map_err(|source| ConfigError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                info!(path = %path.display(), "Loaded policy file");
                policy
            }
            None => {
                debug!("No policy file configured, using built-in tables");
                PolicyConfig::default()
            }
        };

        if let Some(label) = &self.default_button_label {
            policy.default_button_label = label.clone();
        }

        Ok(policy)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
