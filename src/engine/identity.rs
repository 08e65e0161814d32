use std::sync::Arc;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use tracing::info;

use crate::wallet::keys::{obtain_private_key, parse_keypair_string};

use super::error::EngineResult;
use super::prompt::Prompter;

/// 本次运行的钱包身份，既是 owner 也是手续费支付者。
#[derive(Clone)]
pub struct OwnerIdentity {
    pub pubkey: Pubkey,
    pub signer: Arc<Keypair>,
}

impl OwnerIdentity {
    pub fn from_private_key(raw: &str) -> EngineResult<Self> {
        let keypair = parse_keypair_string(raw)?;
        Ok(Self::from_keypair(keypair))
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            pubkey: keypair.pubkey(),
            signer: Arc::new(keypair),
        }
    }

    /// 通过终端交互获取私钥。
    pub async fn obtain<P>(prompter: &mut P) -> EngineResult<Self>
    where
        P: Prompter + ?Sized,
    {
        let raw = obtain_private_key(prompter).await?;
        let identity = Self::from_private_key(&raw)?;
        info!(target: "engine::identity", owner = %identity.pubkey, "私钥已加载");
        Ok(identity)
    }
}

impl std::fmt::Debug for OwnerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerIdentity")
            .field("pubkey", &self.pubkey)
            .finish_non_exhaustive()
    }
}
