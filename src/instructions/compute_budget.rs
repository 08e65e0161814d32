use std::mem;

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

pub const COMPUTE_BUDGET_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ComputeBudget111111111111111111111111111111");

/// 单笔交易允许的最大 compute unit，用于模拟估算阶段。
pub const MAX_COMPUTE_UNIT_LIMIT: u32 = 1_400_000;

const SET_COMPUTE_UNIT_LIMIT_TAG: u8 = 2;

pub fn compute_unit_limit_instruction(limit: u32) -> Instruction {
    let mut data = Vec::with_capacity(1 + mem::size_of::<u32>());
    data.push(SET_COMPUTE_UNIT_LIMIT_TAG);
    data.extend_from_slice(&limit.to_le_bytes());
    Instruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: Vec::new(),
        data,
    }
}

pub fn is_compute_budget(ix: &Instruction) -> bool {
    ix.program_id == COMPUTE_BUDGET_PROGRAM_ID
}

pub fn is_compute_unit_limit(ix: &Instruction) -> bool {
    is_compute_budget(ix) && ix.data.first().copied() == Some(SET_COMPUTE_UNIT_LIMIT_TAG)
}

/// 将 compute unit 上限指令放在最前面，替换已有的上限指令。
pub fn with_compute_unit_limit(limit: u32, instructions: &[Instruction]) -> Vec<Instruction> {
    let mut sequence = Vec::with_capacity(instructions.len() + 1);
    sequence.push(compute_unit_limit_instruction(limit));
    sequence.extend(
        instructions
            .iter()
            .filter(|ix| !is_compute_unit_limit(ix))
            .cloned(),
    );
    sequence
}

/// 模拟结果换算为上限值，超出协议上限时截断。
pub fn units_to_limit(units_consumed: u64) -> u32 {
    u32::try_from(units_consumed)
        .unwrap_or(MAX_COMPUTE_UNIT_LIMIT)
        .min(MAX_COMPUTE_UNIT_LIMIT)
}
