use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use tracing::{info, warn};

use crate::config::SweepConfig;
use crate::instructions::{ClosePlan, assemble};
use crate::lookup::{TokenInfo, TokenInfoSource, resolve_all};
use crate::rpc::ChainRpc;
use crate::wallet::{TokenAccountRecord, fetch_token_accounts};

use super::builder::TransactionSubmitter;
use super::confirm::ConfirmationEngine;
use super::error::EngineResult;
use super::identity::OwnerIdentity;
use super::prompt::{Prompter, Tone, is_affirmative};
use super::types::{SweepOutcome, SweepStage};

/// 一次完整的清理流程：加载私钥、枚举账户、逐个确认、批量提交。
pub struct SweepSession<R: ?Sized, S: ?Sized> {
    rpc: Arc<R>,
    token_info: Arc<S>,
    config: SweepConfig,
    show_progress: bool,
}

impl<R, S> SweepSession<R, S>
where
    R: ChainRpc + ?Sized,
    S: TokenInfoSource + ?Sized,
{
    pub fn new(rpc: Arc<R>, token_info: Arc<S>, config: SweepConfig) -> Self {
        Self {
            rpc,
            token_info,
            config,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn run<P>(&self, prompter: &mut P) -> EngineResult<SweepOutcome>
    where
        P: Prompter + ?Sized,
    {
        log_stage(SweepStage::Idle);
        let identity = OwnerIdentity::obtain(prompter).await?;
        log_stage(SweepStage::KeyLoaded);
        self.run_with_identity(prompter, &identity).await
    }

    pub async fn run_with_identity<P>(
        &self,
        prompter: &mut P,
        identity: &OwnerIdentity,
    ) -> EngineResult<SweepOutcome>
    where
        P: Prompter + ?Sized,
    {
        prompter.notify(
            Tone::Info,
            &format!("Cleaning token dust from {}", identity.pubkey),
        );

        let records = fetch_token_accounts(self.rpc.as_ref(), &identity.pubkey).await?;
        info!(
            target: "engine::session",
            stage = %SweepStage::AccountsEnumerated,
            count = records.len(),
            "token 账户枚举完成"
        );

        let infos = self.lookup(&records).await;
        let approved = ConfirmationEngine::new(self.config.high_value_threshold_usd)
            .collect(prompter, &records, &infos)
            .await?;
        info!(
            target: "engine::session",
            stage = %SweepStage::DecisionsCollected,
            approved = approved.len(),
            total = records.len(),
            "用户确认完成"
        );

        if approved.is_empty() {
            prompter.notify(Tone::Failure, "\nNo accounts to close");
            return Ok(SweepOutcome::NothingToClose);
        }

        let plan = assemble(&identity.pubkey, &approved)?;
        info!(
            target: "engine::session",
            stage = %SweepStage::InstructionsBuilt,
            instructions = plan.instructions.len(),
            reclaim_lamports = plan.reclaim_lamports,
            "销毁/关闭指令已组装"
        );

        if !self.confirm_batch(prompter, &plan).await? {
            info!(target: "engine::session", "用户取消最终确认");
            return Ok(SweepOutcome::Cancelled);
        }

        prompter.notify(Tone::Plain, "\nSending transaction to the network...");
        match self.submit(identity, &plan).await {
            Ok(signature) => {
                prompter.notify(
                    Tone::Success,
                    &format!("\nTransaction sent with success: {signature}"),
                );
                prompter.notify(
                    Tone::Plain,
                    &format!("\n{}", self.config.explorer_link(&signature.to_string())),
                );
                Ok(SweepOutcome::Submitted {
                    signature,
                    accounts_closed: plan.account_count(),
                    reclaimed_lamports: plan.reclaim_lamports,
                })
            }
            Err(err) => {
                warn!(
                    target: "engine::session",
                    stage = %SweepStage::Failed,
                    error = %err,
                    "交易提交失败"
                );
                Err(err)
            }
        }
    }

    async fn lookup(&self, records: &[TokenAccountRecord]) -> HashMap<Pubkey, TokenInfo> {
        if records.is_empty() {
            return HashMap::new();
        }
        let spinner = self.lookup_spinner();
        let infos = resolve_all(self.token_info.as_ref(), records.iter().map(|r| r.mint)).await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        infos
    }

    fn lookup_spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message("Fetching token prices and metadata...");
        Some(pb)
    }

    async fn confirm_batch<P>(&self, prompter: &mut P, plan: &ClosePlan) -> EngineResult<bool>
    where
        P: Prompter + ?Sized,
    {
        let count = plan.account_count();
        prompter.notify(Tone::Info, &format!("\nAccounts to close: {count}"));
        prompter.notify(
            Tone::Info,
            &format!("Rent to claim: {:.4} SOL", plan.reclaim_sol()),
        );
        let answer = prompter
            .ask(&format!(
                "\nAre you sure you want to close {count} token accounts? [Y/n] "
            ))
            .await?;
        Ok(is_affirmative(&answer))
    }

    async fn submit(
        &self,
        identity: &OwnerIdentity,
        plan: &ClosePlan,
    ) -> EngineResult<Signature> {
        let submitter = TransactionSubmitter::new(self.rpc.clone());
        let prepared = submitter.prepare(identity, &plan.instructions).await?;
        submitter.submit(&prepared).await
    }
}

fn log_stage(stage: SweepStage) {
    info!(target: "engine::session", stage = %stage, "阶段推进");
}
