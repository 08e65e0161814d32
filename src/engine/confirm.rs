use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::lookup::TokenInfo;
use crate::wallet::TokenAccountRecord;

use super::error::EngineResult;
use super::prompt::{Prompter, Tone, is_affirmative};

/// 逐个账户向用户确认是否关闭，问题严格串行。
#[derive(Debug, Clone)]
pub struct ConfirmationEngine {
    high_value_threshold_usd: Decimal,
}

impl ConfirmationEngine {
    pub fn new(high_value_threshold_usd: Decimal) -> Self {
        Self {
            high_value_threshold_usd,
        }
    }

    /// 按枚举顺序返回被批准的账户。
    pub async fn collect<P>(
        &self,
        prompter: &mut P,
        records: &[TokenAccountRecord],
        infos: &HashMap<Pubkey, TokenInfo>,
    ) -> EngineResult<Vec<TokenAccountRecord>>
    where
        P: Prompter + ?Sized,
    {
        let unknown = TokenInfo::default();
        let mut approved = Vec::new();
        for record in records {
            let info = infos.get(&record.mint).unwrap_or(&unknown);
            if self.decide(prompter, record, info).await? {
                prompter.notify(Tone::Success, &format!("Closing account {}", record.address));
                approved.push(record.clone());
            }
        }
        Ok(approved)
    }

    pub async fn decide<P>(
        &self,
        prompter: &mut P,
        record: &TokenAccountRecord,
        info: &TokenInfo,
    ) -> EngineResult<bool>
    where
        P: Prompter + ?Sized,
    {
        let answer = prompter.ask(&question(record, info)).await?;
        if !is_affirmative(&answer) {
            debug!(target: "engine::confirm", account = %record.address, "用户跳过该账户");
            return Ok(false);
        }

        let value = fiat_value(record, info);
        if value > self.high_value_threshold_usd {
            let answer = prompter
                .ask(&format!(
                    "Are you sure you want to close the account with a balance of ${}? [Y/n] ",
                    format_usd(value)
                ))
                .await?;
            if !is_affirmative(&answer) {
                debug!(
                    target: "engine::confirm",
                    account = %record.address,
                    value = %value,
                    "用户拒绝关闭高价值账户"
                );
                return Ok(false);
            }
        }

        Ok(true)
    }
}

pub fn question(record: &TokenAccountRecord, info: &TokenInfo) -> String {
    let has_balance = record.balance > Decimal::ZERO;
    let action = if has_balance { "burn and close " } else { "close " };
    let holding = match info.symbol.as_deref() {
        Some(symbol) => {
            let mut holding = format!("{} {symbol}", record.balance);
            let priced = info.price_usd.is_some_and(|price| !price.is_zero());
            if priced && has_balance {
                holding.push_str(&format!(" (${})", format_usd(fiat_value(record, info))));
            }
            holding
        }
        None => format!("{} tokens", record.balance),
    };
    format!(
        "\nDo you want to {action}the account from token {} with {holding}? [Y/n] ",
        record.mint
    )
}

/// 价格未知时为 0。
pub fn fiat_value(record: &TokenAccountRecord, info: &TokenInfo) -> Decimal {
    match info.price_usd {
        Some(price) => price.checked_mul(record.balance).unwrap_or(Decimal::MAX),
        None => Decimal::ZERO,
    }
}

fn format_usd(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
