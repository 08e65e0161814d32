use solana_sdk::instruction::Instruction;
use solana_sdk::native_token::LAMPORTS_PER_SOL;
use solana_sdk::pubkey::Pubkey;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::wallet::TokenAccountRecord;

#[derive(Debug, Error)]
pub enum CloseError {
    #[error("构建 {account} 的 {action} 指令失败: {message}")]
    Instruction {
        account: Pubkey,
        action: &'static str,
        message: String,
    },
    #[error("可回收 lamports 总数溢出")]
    LamportsOverflow,
}

/// 一次运行要提交的销毁/关闭指令批次。
#[derive(Debug, Clone, Default)]
pub struct ClosePlan {
    pub instructions: Vec<Instruction>,
    pub closed_accounts: Vec<Pubkey>,
    pub reclaim_lamports: u64,
}

impl ClosePlan {
    pub fn account_count(&self) -> usize {
        self.closed_accounts.len()
    }

    /// 以 SOL 表示的可回收租金，保留 4 位小数。
    pub fn reclaim_sol(&self) -> Decimal {
        lamports_to_sol(self.reclaim_lamports)
    }
}

pub fn lamports_to_sol(lamports: u64) -> Decimal {
    (Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL))
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// 非零余额先 burn 再 close；零余额只 close。租金退回 owner。
pub fn assemble(owner: &Pubkey, approved: &[TokenAccountRecord]) -> Result<ClosePlan, CloseError> {
    let mut plan = ClosePlan {
        instructions: Vec::with_capacity(approved.len() * 2),
        closed_accounts: Vec::with_capacity(approved.len()),
        reclaim_lamports: 0,
    };

    for record in approved {
        if !record.is_empty() {
            plan.instructions.push(burn_instruction(owner, record)?);
        }
        plan.instructions.push(close_instruction(owner, record)?);
        plan.closed_accounts.push(record.address);
        plan.reclaim_lamports = plan
            .reclaim_lamports
            .checked_add(record.lamports)
            .ok_or(CloseError::LamportsOverflow)?;
    }

    Ok(plan)
}

fn burn_instruction(owner: &Pubkey, record: &TokenAccountRecord) -> Result<Instruction, CloseError> {
    spl_token::instruction::burn_checked(
        &spl_token::id(),
        &record.address,
        &record.mint,
        owner,
        &[],
        record.amount,
        record.decimals,
    )
    .map_err(|err| CloseError::Instruction {
        account: record.address,
        action: "burn",
        message: err.to_string(),
    })
}

fn close_instruction(owner: &Pubkey, record: &TokenAccountRecord) -> Result<Instruction, CloseError> {
    spl_token::instruction::close_account(&spl_token::id(), &record.address, owner, owner, &[])
        .map_err(|err| CloseError::Instruction {
            account: record.address,
            action: "close",
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use spl_token::instruction::TokenInstruction;

    use super::*;

    fn record(amount: u64, lamports: u64) -> TokenAccountRecord {
        TokenAccountRecord {
            address: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            amount,
            decimals: 6,
            balance: Decimal::new(amount as i64, 6).normalize(),
            lamports,
        }
    }

    #[test]
    fn empty_account_gets_single_close() {
        let owner = Pubkey::new_unique();
        let empty = record(0, 2_039_280);
        let plan = assemble(&owner, std::slice::from_ref(&empty)).expect("plan");

        assert_eq!(plan.instructions.len(), 1);
        let ix = &plan.instructions[0];
        assert_eq!(ix.program_id, spl_token::id());
        assert!(matches!(
            TokenInstruction::unpack(&ix.data).expect("unpack"),
            TokenInstruction::CloseAccount
        ));
        assert_eq!(ix.accounts[0].pubkey, empty.address);
        assert_eq!(ix.accounts[1].pubkey, owner);
        assert_eq!(ix.accounts[2].pubkey, owner);
        assert!(ix.accounts[2].is_signer);
    }

    #[test]
    fn funded_account_burns_then_closes() {
        let owner = Pubkey::new_unique();
        let funded = record(5_000_000, 2_039_280);
        let plan = assemble(&owner, std::slice::from_ref(&funded)).expect("plan");

        assert_eq!(plan.instructions.len(), 2);
        match TokenInstruction::unpack(&plan.instructions[0].data).expect("unpack burn") {
            TokenInstruction::BurnChecked { amount, decimals } => {
                assert_eq!(amount, 5_000_000);
                assert_eq!(decimals, 6);
            }
            other => panic!("unexpected instruction {other:?}"),
        }
        let burn_accounts: Vec<_> = plan.instructions[0]
            .accounts
            .iter()
            .map(|meta| meta.pubkey)
            .collect();
        assert_eq!(burn_accounts, vec![funded.address, funded.mint, owner]);
        assert!(matches!(
            TokenInstruction::unpack(&plan.instructions[1].data).expect("unpack close"),
            TokenInstruction::CloseAccount
        ));
        assert_eq!(plan.instructions[1].accounts[0].pubkey, funded.address);
    }

    #[test]
    fn reclaim_sums_only_given_accounts() {
        let owner = Pubkey::new_unique();
        let approved = vec![record(0, 2_039_280), record(7, 2_039_281), record(0, 1)];
        let plan = assemble(&owner, &approved).expect("plan");

        assert_eq!(plan.account_count(), 3);
        assert_eq!(plan.reclaim_lamports, 2_039_280 + 2_039_281 + 1);
        assert_eq!(plan.instructions.len(), 4);
    }

    #[test]
    fn nothing_approved_yields_empty_plan() {
        let plan = assemble(&Pubkey::new_unique(), &[]).expect("plan");
        assert_eq!(plan.account_count(), 0);
        assert!(plan.instructions.is_empty());
        assert_eq!(plan.reclaim_lamports, 0);
    }

    #[test]
    fn lamport_overflow_is_reported() {
        let owner = Pubkey::new_unique();
        let approved = vec![record(0, u64::MAX), record(0, 1)];
        assert!(matches!(
            assemble(&owner, &approved),
            Err(CloseError::LamportsOverflow)
        ));
    }

    #[test]
    fn sol_amount_is_rounded_to_four_places() {
        assert_eq!(format!("{:.4}", lamports_to_sol(2_039_280)), "0.0020");
        assert_eq!(format!("{:.4}", lamports_to_sol(4_078_560)), "0.0041");
        assert_eq!(format!("{:.4}", lamports_to_sol(0)), "0.0000");
    }
}
