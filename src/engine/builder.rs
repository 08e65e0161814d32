use std::sync::Arc;

use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::Message;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tracing::{debug, info, warn};

use crate::instructions::compute_budget::{
    MAX_COMPUTE_UNIT_LIMIT, units_to_limit, with_compute_unit_limit,
};
use crate::rpc::ChainRpc;

use super::error::{EngineError, EngineResult};
use super::identity::OwnerIdentity;
use super::types::SweepStage;

#[derive(Clone, Debug)]
pub struct PreparedTransaction {
    pub transaction: Transaction,
    pub compute_unit_limit: u32,
}

impl PreparedTransaction {
    pub fn signature(&self) -> Option<Signature> {
        self.transaction.signatures.first().copied()
    }
}

/// 构建、估算、签名并发送单笔 legacy 交易。
pub struct TransactionSubmitter<R: ?Sized> {
    rpc: Arc<R>,
}

impl<R: ChainRpc + ?Sized> TransactionSubmitter<R> {
    pub fn new(rpc: Arc<R>) -> Self {
        Self { rpc }
    }

    pub async fn prepare(
        &self,
        identity: &OwnerIdentity,
        instructions: &[Instruction],
    ) -> EngineResult<PreparedTransaction> {
        let blockhash = self
            .rpc
            .latest_blockhash()
            .await
            .map_err(EngineError::from_client)?;
        log_stage(SweepStage::BlockhashFetched);

        let compute_unit_limit = self.estimate_units(identity, instructions, blockhash).await?;
        info!(
            target: "engine::builder",
            compute_unit_limit,
            stage = %SweepStage::ComputeEstimated,
            "compute unit 估算完成"
        );

        let sequence = with_compute_unit_limit(compute_unit_limit, instructions);
        let message = Message::new_with_blockhash(&sequence, Some(&identity.pubkey), &blockhash);
        let mut transaction = Transaction::new_unsigned(message);
        transaction
            .try_sign(&[identity.signer.as_ref()], blockhash)
            .map_err(|err| EngineError::Signing(err.to_string()))?;
        log_stage(SweepStage::Signed);

        Ok(PreparedTransaction {
            transaction,
            compute_unit_limit,
        })
    }

    /// 发送并等待 confirmed。
    pub async fn submit(&self, prepared: &PreparedTransaction) -> EngineResult<Signature> {
        info!(
            target: "engine::builder",
            signature = ?prepared.signature(),
            compute_unit_limit = prepared.compute_unit_limit,
            stage = %SweepStage::Submitted,
            "发送交易"
        );
        let signature = self
            .rpc
            .send_and_confirm(&prepared.transaction)
            .await
            .map_err(EngineError::from_client)?;
        info!(
            target: "engine::builder",
            %signature,
            stage = %SweepStage::Confirmed,
            "交易已确认"
        );
        Ok(signature)
    }

    async fn estimate_units(
        &self,
        identity: &OwnerIdentity,
        instructions: &[Instruction],
        blockhash: Hash,
    ) -> EngineResult<u32> {
        let provisional = with_compute_unit_limit(MAX_COMPUTE_UNIT_LIMIT, instructions);
        let message = Message::new_with_blockhash(&provisional, Some(&identity.pubkey), &blockhash);
        let unsigned = Transaction::new_unsigned(message);

        let outcome = self
            .rpc
            .simulate(&unsigned)
            .await
            .map_err(EngineError::from_client)?;

        if let Some(err) = outcome.err {
            warn!(
                target: "engine::builder",
                error = %err,
                logs = ?outcome.logs,
                "交易模拟失败"
            );
            return Err(EngineError::Simulation {
                err,
                logs: outcome.logs,
            });
        }

        let units = outcome.units_consumed.ok_or(EngineError::MissingUnits)?;
        debug!(target: "engine::builder", units, "模拟消耗 compute unit");
        Ok(units_to_limit(units))
    }
}

fn log_stage(stage: SweepStage) {
    debug!(target: "engine::builder", stage = %stage, "阶段推进");
}
