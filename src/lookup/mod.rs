//! 代币价格与符号查询。所有失败都折叠为“未知”，不会中断流程。

pub mod metadata;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, warn};

use crate::api::DexscreenerClient;
use crate::rpc::ChainRpc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: Option<String>,
    pub price_usd: Option<Decimal>,
}

#[async_trait]
pub trait TokenInfoSource: Send + Sync {
    async fn token_info(&self, mint: &Pubkey) -> TokenInfo;
}

/// 价格走 DexScreener，符号走链上 metadata 账户。
pub struct LiveTokenInfo<R: ?Sized> {
    prices: DexscreenerClient,
    rpc: Arc<R>,
}

impl<R: ChainRpc + ?Sized> LiveTokenInfo<R> {
    pub fn new(prices: DexscreenerClient, rpc: Arc<R>) -> Self {
        Self { prices, rpc }
    }

    async fn symbol(&self, mint: &Pubkey) -> Option<String> {
        let address = metadata::metadata_address(mint);
        let data = match self.rpc.account_data(&address).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                debug!(target: "lookup", %mint, %address, "metadata 账户不存在");
                return None;
            }
            Err(err) => {
                warn!(target: "lookup", %mint, error = %err, "metadata 查询失败，按未知处理");
                return None;
            }
        };

        match metadata::decode_symbol(&data) {
            Ok(symbol) => symbol,
            Err(err) => {
                warn!(target: "lookup", %mint, error = %err, "metadata 解析失败，按未知处理");
                None
            }
        }
    }
}

#[async_trait]
impl<R: ChainRpc + ?Sized> TokenInfoSource for LiveTokenInfo<R> {
    async fn token_info(&self, mint: &Pubkey) -> TokenInfo {
        let (price_usd, symbol) = tokio::join!(self.prices.price_usd(mint), self.symbol(mint));
        TokenInfo { symbol, price_usd }
    }
}

/// 按 mint 去重后并发查询。
pub async fn resolve_all<S>(
    source: &S,
    mints: impl IntoIterator<Item = Pubkey>,
) -> HashMap<Pubkey, TokenInfo>
where
    S: TokenInfoSource + ?Sized,
{
    let mut unique: Vec<Pubkey> = Vec::new();
    for mint in mints {
        if !unique.contains(&mint) {
            unique.push(mint);
        }
    }

    let infos = join_all(unique.iter().map(|mint| source.token_info(mint))).await;
    unique.into_iter().zip(infos).collect()
}
