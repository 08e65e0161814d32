use std::io;

use solana_client::client_error::ClientError;
use thiserror::Error;

use crate::instructions::CloseError;
use crate::rpc::is_chain_rejection;
use crate::wallet::keys::KeyError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("私钥加载失败: {0}")]
    Key(KeyError),
    #[error("RPC 请求失败: {0}")]
    Rpc(#[source] ClientError),
    #[error("{0}")]
    Chain(#[source] ClientError),
    #[error("交易模拟失败: {err}")]
    Simulation { err: String, logs: Vec<String> },
    #[error("交易模拟未返回 unitsConsumed")]
    MissingUnits,
    #[error("交易签名失败: {0}")]
    Signing(String),
    #[error("指令构建失败: {0}")]
    Instruction(#[from] CloseError),
    #[error("终端交互失败: {0}")]
    Prompt(#[source] io::Error),
    #[error("用户中断")]
    Interrupted,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// 节点或签名器明确拒绝，向用户展示后正常退出。
    pub fn is_recognized(&self) -> bool {
        matches!(
            self,
            EngineError::Chain(_)
                | EngineError::Simulation { .. }
                | EngineError::MissingUnits
                | EngineError::Signing(_)
        )
    }

    pub fn from_client(err: ClientError) -> Self {
        if is_chain_rejection(&err) {
            EngineError::Chain(err)
        } else {
            EngineError::Rpc(err)
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::Interrupted {
            EngineError::Interrupted
        } else {
            EngineError::Prompt(err)
        }
    }
}

impl From<KeyError> for EngineError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::Prompt(inner) => EngineError::from(inner),
            other => EngineError::Key(other),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
