use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RentsweepConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub price_api: PriceApiConfig,
    #[serde(default)]
    pub sweep: SweepConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    #[serde(default, deserialize_with = "super::deserialize_optional_trimmed")]
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "super::default_logging_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceApiConfig {
    #[serde(default = "super::default_price_api_base_url")]
    pub base_url: String,
    #[serde(default = "super::default_price_chain_id")]
    pub chain_id: String,
    #[serde(default = "super::default_price_timeout_ms")]
    pub timeout_ms: u64,
}

impl PriceApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepConfig {
    /// 超过该美元价值的账户需要二次确认。
    #[serde(default = "super::default_high_value_threshold_usd")]
    pub high_value_threshold_usd: Decimal,
    #[serde(default = "super::default_explorer_tx_url")]
    pub explorer_tx_url: String,
}

impl SweepConfig {
    pub fn explorer_link(&self, signature: &str) -> String {
        format!("{}/{}", self.explorer_tx_url.trim_end_matches('/'), signature)
    }
}
