use borsh::BorshDeserialize;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

pub const METADATA_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

const METADATA_SEED: &[u8] = b"metadata";
const KEY_METADATA_V1: u8 = 4;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata 账户反序列化失败: {0}")]
    Decode(#[from] std::io::Error),
    #[error("metadata 账户类型不符: key={0}")]
    UnexpectedKey(u8),
}

/// Metadata 账户的固定前缀；其后的可选字段与符号解析无关。
#[derive(Debug, Clone, PartialEq, Eq, BorshDeserialize)]
#[cfg_attr(test, derive(borsh::BorshSerialize))]
pub struct MetadataPrefix {
    pub key: u8,
    pub update_authority: [u8; 32],
    pub mint: [u8; 32],
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[METADATA_SEED, METADATA_PROGRAM_ID.as_ref(), mint.as_ref()],
        &METADATA_PROGRAM_ID,
    )
    .0
}

pub fn decode_prefix(data: &[u8]) -> Result<MetadataPrefix, MetadataError> {
    let mut cursor = data;
    let prefix = MetadataPrefix::deserialize(&mut cursor)?;
    if prefix.key != KEY_METADATA_V1 {
        return Err(MetadataError::UnexpectedKey(prefix.key));
    }
    Ok(prefix)
}

/// 链上字符串以 NUL 填充到定长，去掉填充后为空则视为无符号。
pub fn decode_symbol(data: &[u8]) -> Result<Option<String>, MetadataError> {
    let prefix = decode_prefix(data)?;
    let symbol = prefix.symbol.trim_matches(char::from(0)).trim();
    if symbol.is_empty() {
        Ok(None)
    } else {
        Ok(Some(symbol.to_string()))
    }
}
