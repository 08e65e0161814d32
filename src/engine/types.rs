use std::fmt;

use solana_sdk::signature::Signature;

/// 单次运行经过的阶段，只前进不回退。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStage {
    Idle,
    KeyLoaded,
    AccountsEnumerated,
    DecisionsCollected,
    InstructionsBuilt,
    BlockhashFetched,
    ComputeEstimated,
    Signed,
    Submitted,
    Confirmed,
    Failed,
}

impl SweepStage {
    pub fn as_str(self) -> &'static str {
        match self {
            SweepStage::Idle => "idle",
            SweepStage::KeyLoaded => "key_loaded",
            SweepStage::AccountsEnumerated => "accounts_enumerated",
            SweepStage::DecisionsCollected => "decisions_collected",
            SweepStage::InstructionsBuilt => "instructions_built",
            SweepStage::BlockhashFetched => "blockhash_fetched",
            SweepStage::ComputeEstimated => "compute_estimated",
            SweepStage::Signed => "signed",
            SweepStage::Submitted => "submitted",
            SweepStage::Confirmed => "confirmed",
            SweepStage::Failed => "failed",
        }
    }
}

impl fmt::Display for SweepStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// 没有任何账户被批准关闭。
    NothingToClose,
    /// 用户在最终确认时拒绝。
    Cancelled,
    Submitted {
        signature: Signature,
        accounts_closed: usize,
        reclaimed_lamports: u64,
    },
}
