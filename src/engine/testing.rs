//! 测试用的脚本化终端与内存 RPC。

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;

use async_trait::async_trait;
use solana_client::client_error::ClientError;
use solana_client::rpc_response::RpcKeyedAccount;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, TransactionError};

use crate::lookup::{TokenInfo, TokenInfoSource};
use crate::rpc::{ChainRpc, SimulationOutcome};

use super::prompt::{Prompter, Tone};

/// 按顺序回放预设回答，并记录所有输出。
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    selection: usize,
    secret: Option<String>,
    exhausted: io::ErrorKind,
    pub questions: Vec<String>,
    pub secret_questions: Vec<String>,
    pub menus: Vec<String>,
    pub notices: Vec<String>,
    pub tones: Vec<Tone>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            selection: 0,
            secret: None,
            exhausted: io::ErrorKind::UnexpectedEof,
            questions: Vec::new(),
            secret_questions: Vec::new(),
            menus: Vec::new(),
            notices: Vec::new(),
            tones: Vec::new(),
        }
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selection = index;
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// 回答耗尽后模拟 Ctrl-C。
    pub fn interrupt_when_exhausted(mut self) -> Self {
        self.exhausted = io::ErrorKind::Interrupted;
        self
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&mut self, question: &str) -> io::Result<String> {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| io::Error::new(self.exhausted, "脚本回答已耗尽"))
    }

    async fn ask_secret(&mut self, question: &str) -> io::Result<String> {
        self.secret_questions.push(question.to_string());
        self.secret
            .take()
            .ok_or_else(|| io::Error::new(self.exhausted, "未设置私钥输入"))
    }

    async fn select(&mut self, title: &str, items: &[&str]) -> io::Result<usize> {
        self.menus.push(title.to_string());
        if self.selection < items.len() {
            Ok(self.selection)
        } else {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "选项越界"))
        }
    }

    fn notify(&mut self, tone: Tone, message: &str) {
        self.tones.push(tone);
        self.notices.push(message.to_string());
    }
}

/// 内存中的链上状态，记录模拟与发送过的交易。
pub struct MockRpc {
    pub accounts: Vec<RpcKeyedAccount>,
    pub metadata: HashMap<Pubkey, Vec<u8>>,
    pub blockhash: Hash,
    pub simulation: SimulationOutcome,
    pub send_error: Option<TransactionError>,
    pub simulated: Mutex<Vec<Transaction>>,
    pub sent: Mutex<Vec<Transaction>>,
}

impl Default for MockRpc {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            metadata: HashMap::new(),
            blockhash: Hash::new_from_array([7; 32]),
            simulation: SimulationOutcome {
                err: None,
                logs: Vec::new(),
                units_consumed: Some(12_000),
            },
            send_error: None,
            simulated: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl MockRpc {
    pub fn with_accounts(mut self, accounts: Vec<RpcKeyedAccount>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_metadata(mut self, address: Pubkey, data: Vec<u8>) -> Self {
        self.metadata.insert(address, data);
        self
    }

    pub fn with_units(mut self, units: u64) -> Self {
        self.simulation.units_consumed = Some(units);
        self
    }

    pub fn with_simulation(mut self, outcome: SimulationOutcome) -> Self {
        self.simulation = outcome;
        self
    }

    pub fn with_send_error(mut self, err: TransactionError) -> Self {
        self.send_error = Some(err);
        self
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|sent| sent.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ChainRpc for MockRpc {
    async fn token_accounts_by_owner(
        &self,
        _owner: &Pubkey,
    ) -> Result<Vec<RpcKeyedAccount>, ClientError> {
        Ok(self.accounts.clone())
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, ClientError> {
        Ok(self.metadata.get(address).cloned())
    }

    async fn latest_blockhash(&self) -> Result<Hash, ClientError> {
        Ok(self.blockhash)
    }

    async fn simulate(&self, transaction: &Transaction) -> Result<SimulationOutcome, ClientError> {
        self.simulated
            .lock()
            .expect("simulated lock")
            .push(transaction.clone());
        Ok(self.simulation.clone())
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, ClientError> {
        self.sent.lock().expect("sent lock").push(transaction.clone());
        if let Some(err) = &self.send_error {
            return Err(ClientError::from(err.clone()));
        }
        Ok(transaction.signatures.first().copied().unwrap_or_default())
    }
}

/// 固定的代币信息表，未登记的 mint 视为未知。
#[derive(Default)]
pub struct StaticTokenInfo {
    infos: HashMap<Pubkey, TokenInfo>,
}

impl StaticTokenInfo {
    pub fn with(mut self, mint: Pubkey, symbol: &str, price_usd: Option<rust_decimal::Decimal>) -> Self {
        self.infos.insert(
            mint,
            TokenInfo {
                symbol: Some(symbol.to_string()),
                price_usd,
            },
        );
        self
    }
}

#[async_trait]
impl TokenInfoSource for StaticTokenInfo {
    async fn token_info(&self, mint: &Pubkey) -> TokenInfo {
        self.infos.get(mint).cloned().unwrap_or_default()
    }
}
