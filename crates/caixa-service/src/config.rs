//! # Store Configuration
//!
//! Configuration for one store's register engine, loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CAIXA_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.
//! If hot-reloading is added later, we'd wrap in `RwLock`.

use caixa_core::Money;
use serde::{Deserialize, Serialize};

/// Store-level configuration for the register engine.
///
/// ## Fields
/// Most fields have sensible defaults for development.
/// Production deployments should configure these properly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Store identifier; scopes the single-open-register invariant.
    pub store_id: String,

    /// Store name (displayed on reports)
    pub store_name: String,

    /// Display labels terminals may pick when starting a session.
    /// Labels are NOT reserved: two operators may use the same one.
    pub terminal_names: Vec<String>,

    /// Default lock threshold in cents applied at register open when the
    /// opener does not pass an override. `None` disables locking.
    pub default_lock_threshold_cents: Option<i64>,

    /// Currency symbol (for display)
    pub currency_symbol: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            store_id: "default".to_string(),
            store_name: "Loja".to_string(),
            terminal_names: vec![
                "Balcão 1".to_string(),
                "Balcão 2".to_string(),
                "Mesa".to_string(),
            ],
            default_lock_threshold_cents: None,
            currency_symbol: "R$".to_string(),
        }
    }
}

impl StoreConfig {
    /// Loads configuration from defaults, overridden by `CAIXA_*` env vars.
    ///
    /// ## Recognized Variables
    /// - `CAIXA_STORE_ID`
    /// - `CAIXA_STORE_NAME`
    /// - `CAIXA_TERMINAL_NAMES` (comma-separated)
    /// - `CAIXA_LOCK_THRESHOLD_CENTS` (empty or unset = no threshold)
    /// - `CAIXA_CURRENCY_SYMBOL`
    pub fn from_env() -> Self {
        let mut config = StoreConfig::default();

        if let Ok(v) = std::env::var("CAIXA_STORE_ID") {
            config.store_id = v;
        }
        if let Ok(v) = std::env::var("CAIXA_STORE_NAME") {
            config.store_name = v;
        }
        if let Ok(v) = std::env::var("CAIXA_TERMINAL_NAMES") {
            let names: Vec<String> = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !names.is_empty() {
                config.terminal_names = names;
            }
        }
        if let Ok(v) = std::env::var("CAIXA_LOCK_THRESHOLD_CENTS") {
            config.default_lock_threshold_cents = v.parse::<i64>().ok().filter(|c| *c > 0);
        }
        if let Ok(v) = std::env::var("CAIXA_CURRENCY_SYMBOL") {
            config.currency_symbol = v;
        }

        config
    }

    /// Formats a money amount with the configured currency symbol.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = StoreConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(10_99)), "R$ 10.99");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.abs();
        format!(
            "{}{} {}.{:02}",
            sign,
            self.currency_symbol,
            abs / 100,
            abs % 100
        )
    }
}
