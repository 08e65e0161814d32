use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::Deserializer;

pub mod loader;
pub mod types;

pub use loader::*;
pub use types::*;

use self::types as cfg;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const RPC_URL_ENV: &str = "RENTSWEEP_RPC_URL";

pub(crate) fn default_logging_level() -> String {
    "warn".to_string()
}

pub(crate) fn default_price_api_base_url() -> String {
    "https://api.dexscreener.com".to_string()
}

pub(crate) fn default_price_chain_id() -> String {
    "solana".to_string()
}

pub(crate) fn default_price_timeout_ms() -> u64 {
    10_000
}

pub(crate) fn default_high_value_threshold_usd() -> Decimal {
    Decimal::ONE
}

pub(crate) fn default_explorer_tx_url() -> String {
    "https://solscan.io/tx".to_string()
}

/// 空字符串视为未配置。
pub(crate) fn deserialize_optional_trimmed<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty()))
}

impl Default for cfg::GlobalConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            logging: cfg::LoggingConfig::default(),
        }
    }
}

impl Default for cfg::LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_logging_level(),
            json: false,
        }
    }
}

impl Default for cfg::PriceApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_price_api_base_url(),
            chain_id: default_price_chain_id(),
            timeout_ms: default_price_timeout_ms(),
        }
    }
}

impl Default for cfg::SweepConfig {
    fn default() -> Self {
        Self {
            high_value_threshold_usd: default_high_value_threshold_usd(),
            explorer_tx_url: default_explorer_tx_url(),
        }
    }
}
