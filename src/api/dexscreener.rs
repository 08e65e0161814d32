//! DexScreener 价格查询，仅用于确认提示中的美元估值。

use std::str::FromStr;
use std::time::Duration;

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::PriceApiConfig;

#[derive(Debug, Error)]
pub enum PriceError {
    #[error("DexScreener 请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("请求 {endpoint} 超时（{timeout_ms}ms）")]
    Timeout {
        endpoint: String,
        timeout_ms: u64,
        #[source]
        source: reqwest::Error,
    },
    #[error("请求 {endpoint} 返回状态 {status}")]
    ApiStatus { endpoint: String, status: StatusCode },
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenPairsResponse {
    #[serde(default)]
    pub pairs: Option<Vec<TokenPair>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub price_usd: Option<String>,
}

impl TokenPairsResponse {
    /// 取目标链上的第一个交易对价格。
    pub fn price_on(&self, chain_id: &str) -> Option<Decimal> {
        let pair = self
            .pairs
            .as_deref()?
            .iter()
            .find(|pair| pair.chain_id == chain_id)?;
        let raw = pair.price_usd.as_deref()?.trim();
        Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .ok()
    }
}

#[derive(Clone, Debug)]
pub struct DexscreenerClient {
    base_url: String,
    chain_id: String,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl DexscreenerClient {
    pub fn new(client: reqwest::Client, config: &PriceApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chain_id: config.chain_id.clone(),
            client,
            request_timeout: config.timeout(),
        }
    }

    fn endpoint(&self, mint: &Pubkey) -> String {
        format!("{}/latest/dex/tokens/{}", self.base_url, mint)
    }

    pub async fn token_pairs(&self, mint: &Pubkey) -> Result<TokenPairsResponse, PriceError> {
        let url = self.endpoint(mint);
        let response = self
            .client
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    PriceError::Timeout {
                        endpoint: url.clone(),
                        timeout_ms: self.request_timeout.as_millis() as u64,
                        source: err,
                    }
                } else {
                    PriceError::Http(err)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceError::ApiStatus {
                endpoint: url,
                status,
            });
        }

        Ok(response.json::<TokenPairsResponse>().await?)
    }

    /// 查询失败或没有目标链报价时返回 `None`，不向上抛错。
    pub async fn price_usd(&self, mint: &Pubkey) -> Option<Decimal> {
        match self.token_pairs(mint).await {
            Ok(pairs) => {
                let price = pairs.price_on(&self.chain_id);
                debug!(target: "api::dexscreener", %mint, price = ?price, "价格查询完成");
                price
            }
            Err(err) => {
                warn!(target: "api::dexscreener", %mint, error = %err, "价格查询失败，按未知处理");
                None
            }
        }
    }
}
