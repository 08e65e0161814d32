//! 与链上节点交互的最小接口，便于在测试中替换为内存实现。

use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcSendTransactionConfig, RpcSimulateTransactionConfig};
use solana_client::rpc_request::{RpcError, TokenAccountsFilter};
use solana_client::rpc_response::RpcKeyedAccount;
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use tracing::debug;

/// 交易模拟的结果摘要。
#[derive(Debug, Clone, Default)]
pub struct SimulationOutcome {
    pub err: Option<String>,
    pub logs: Vec<String>,
    pub units_consumed: Option<u64>,
}

#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// 列出 owner 名下所有 SPL Token 账户（jsonParsed）。
    async fn token_accounts_by_owner(
        &self,
        owner: &Pubkey,
    ) -> Result<Vec<RpcKeyedAccount>, ClientError>;

    /// 账户不存在时返回 `None`。
    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ClientError>;

    async fn latest_blockhash(&self) -> Result<Hash, ClientError>;

    async fn simulate(&self, transaction: &Transaction) -> Result<SimulationOutcome, ClientError>;

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, ClientError>;
}

#[async_trait]
impl ChainRpc for RpcClient {
    async fn token_accounts_by_owner(
        &self,
        owner: &Pubkey,
    ) -> Result<Vec<RpcKeyedAccount>, ClientError> {
        self.get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(spl_token::id()))
            .await
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ClientError> {
        let response = self
            .get_account_with_commitment(address, self.commitment())
            .await?;
        Ok(response.value.map(|account| account.data))
    }

    async fn latest_blockhash(&self) -> Result<Hash, ClientError> {
        let (blockhash, last_valid_block_height) = self
            .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())
            .await?;
        debug!(
            target: "rpc",
            %blockhash,
            last_valid_block_height,
            "获取最新区块哈希"
        );
        Ok(blockhash)
    }

    async fn simulate(&self, transaction: &Transaction) -> Result<SimulationOutcome, ClientError> {
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(CommitmentConfig::confirmed()),
            ..RpcSimulateTransactionConfig::default()
        };
        let response = self
            .simulate_transaction_with_config(transaction, config)
            .await?;
        let result = response.value;
        Ok(SimulationOutcome {
            err: result.err.map(|err| format!("{err:?}")),
            logs: result.logs.unwrap_or_default(),
            units_consumed: result.units_consumed,
        })
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, ClientError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(CommitmentLevel::Finalized),
            ..RpcSendTransactionConfig::default()
        };
        self.send_and_confirm_transaction_with_spinner_and_config(
            transaction,
            CommitmentConfig::confirmed(),
            config,
        )
        .await
    }
}

/// 节点明确拒绝（预检失败、交易执行失败、签名失败）的错误，
/// 与传输层故障区分开。
pub fn is_chain_rejection(err: &ClientError) -> bool {
    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError { .. }) => true,
        ClientErrorKind::RpcError(RpcError::ForUser(_)) => true,
        ClientErrorKind::TransactionError(_) => true,
        ClientErrorKind::SigningError(_) => true,
        _ => false,
    }
}
