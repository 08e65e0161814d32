pub mod keys;

use std::str::FromStr;

use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use serde::Deserialize;
use solana_account_decoder::UiAccountData;
use solana_client::rpc_response::RpcKeyedAccount;
use solana_sdk::pubkey::Pubkey;
use tracing::info;

use crate::engine::{EngineError, EngineResult};
use crate::rpc::ChainRpc;

/// 钱包名下的一个 SPL Token 账户快照。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenAccountRecord {
    pub address: Pubkey,
    pub mint: Pubkey,
    /// 原始最小单位数量。
    pub amount: u64,
    pub decimals: u8,
    /// 按 decimals 换算后的余额。
    pub balance: Decimal,
    pub lamports: u64,
}

impl TokenAccountRecord {
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenInfo {
    mint: String,
    token_amount: ParsedTokenAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenAmount {
    amount: String,
    decimals: u8,
    #[serde(default)]
    ui_amount_string: Option<String>,
}

/// 单次 RPC 枚举 owner 的全部 token 账户，保持节点返回的顺序。
pub async fn fetch_token_accounts<R>(rpc: &R, owner: &Pubkey) -> EngineResult<Vec<TokenAccountRecord>>
where
    R: ChainRpc + ?Sized,
{
    let keyed = rpc
        .token_accounts_by_owner(owner)
        .await
        .map_err(EngineError::from_client)?;

    let mut records = Vec::with_capacity(keyed.len());
    for account in &keyed {
        let record = parse_keyed_account(account).map_err(EngineError::Other)?;
        records.push(record);
    }

    info!(
        target: "wallet",
        owner = %owner,
        count = records.len(),
        "已枚举 token 账户"
    );
    Ok(records)
}

pub fn parse_keyed_account(keyed: &RpcKeyedAccount) -> Result<TokenAccountRecord> {
    let address = Pubkey::from_str(&keyed.pubkey)
        .map_err(|err| anyhow!("账户地址非法 {}: {err}", keyed.pubkey))?;

    let parsed = match &keyed.account.data {
        UiAccountData::Json(parsed) => &parsed.parsed,
        _ => return Err(anyhow!("账户 {address} 数据不是 jsonParsed 格式")),
    };
    let info = parsed
        .get("info")
        .cloned()
        .ok_or_else(|| anyhow!("账户 {address} 缺少 info 字段"))?;
    let info: ParsedTokenInfo = serde_json::from_value(info)
        .map_err(|err| anyhow!("账户 {address} info 解析失败: {err}"))?;

    let mint = Pubkey::from_str(&info.mint)
        .map_err(|err| anyhow!("账户 {address} mint 非法: {err}"))?;
    let amount = info
        .token_amount
        .amount
        .parse::<u64>()
        .map_err(|err| anyhow!("账户 {address} 余额非法: {err}"))?;
    let decimals = info.token_amount.decimals;
    let balance = ui_balance(
        amount,
        decimals,
        info.token_amount.ui_amount_string.as_deref(),
    )
    .ok_or_else(|| anyhow!("账户 {address} 无法换算余额"))?;

    Ok(TokenAccountRecord {
        address,
        mint,
        amount,
        decimals,
        balance,
        lamports: keyed.account.lamports,
    })
}

/// 精确换算 decimals；超出 Decimal 精度时退回节点给出的 uiAmountString。
pub fn ui_balance(amount: u64, decimals: u8, ui_amount_string: Option<&str>) -> Option<Decimal> {
    Decimal::try_from_i128_with_scale(i128::from(amount), u32::from(decimals))
        .ok()
        .or_else(|| ui_amount_string.and_then(|raw| Decimal::from_str(raw.trim()).ok()))
        .map(|value| value.normalize())
}
