use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use solana_sdk::signature::Keypair;
use thiserror::Error;
use tracing::info;
use zeroize::Zeroizing;

use crate::engine::prompt::{Prompter, Tone};

const SOURCE_TITLE: &str = "Do you want to paste your raw private key or load from a file?";
const SOURCE_ITEMS: [&str; 2] = ["Paste it", "Read from file"];

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("读取私钥输入失败: {0}")]
    Prompt(#[from] io::Error),
    #[error("读取密钥文件 {path} 失败: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("密钥文件 {path} 不是合法的 JSON 字节数组: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("私钥内容为空")]
    Empty,
    #[error("私钥解码失败: {0}")]
    Decode(String),
    #[error("私钥字节无法构造 keypair: {0}")]
    Keypair(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Paste,
    File,
}

impl KeySource {
    fn from_index(index: usize) -> Self {
        if index == 0 {
            KeySource::Paste
        } else {
            KeySource::File
        }
    }
}

/// 交互式获取私钥，返回 base58 编码的私钥字符串。
pub async fn obtain_private_key<P>(prompter: &mut P) -> Result<Zeroizing<String>, KeyError>
where
    P: Prompter + ?Sized,
{
    let index = prompter.select(SOURCE_TITLE, &SOURCE_ITEMS).await?;

    match KeySource::from_index(index) {
        KeySource::Paste => {
            let raw = Zeroizing::new(prompter.ask_secret("\nEnter your private key: ").await?);
            prompter.notify(Tone::Plain, "");
            Ok(Zeroizing::new(raw.trim().to_string()))
        }
        KeySource::File => {
            let path = prompter.ask("\nChoose a file: ").await?;
            prompter.notify(Tone::Plain, "");
            let path = PathBuf::from(path.trim());
            let encoded = read_key_file(&path)?;
            info!(target: "wallet::keys", path = %path.display(), "已从文件读取私钥");
            Ok(encoded)
        }
    }
}

/// 读取 JSON 字节数组格式的密钥文件，并重新编码为 base58。
pub fn read_key_file(path: &Path) -> Result<Zeroizing<String>, KeyError> {
    let contents = Zeroizing::new(fs::read_to_string(path).map_err(|source| KeyError::Read {
        path: path.to_path_buf(),
        source,
    })?);
    let bytes: Zeroizing<Vec<u8>> = Zeroizing::new(
        serde_json::from_str(contents.trim()).map_err(|source| KeyError::Json {
            path: path.to_path_buf(),
            source,
        })?,
    );
    Ok(Zeroizing::new(bs58::encode(bytes.as_slice()).into_string()))
}

/// 支持 base58、JSON 数组与逗号分隔的字节列表。
pub fn parse_keypair_string(raw: &str) -> Result<Keypair, KeyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(KeyError::Empty);
    }

    let bytes: Zeroizing<Vec<u8>> = if trimmed.starts_with('[') {
        Zeroizing::new(
            serde_json::from_str(trimmed).map_err(|err| KeyError::Decode(err.to_string()))?,
        )
    } else if trimmed.contains(',') {
        Zeroizing::new(
            trimmed
                .split(',')
                .map(|part| part.trim())
                .filter(|part| !part.is_empty())
                .map(|part| part.parse::<u8>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| KeyError::Decode(err.to_string()))?,
        )
    } else {
        Zeroizing::new(
            bs58::decode(trimmed)
                .into_vec()
                .map_err(|err| KeyError::Decode(err.to_string()))?,
        )
    };

    Keypair::try_from(bytes.as_slice()).map_err(|err| KeyError::Keypair(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use solana_sdk::signature::Signer;

    use super::*;
    use crate::engine::testing::ScriptedPrompter;

    fn keypair_json(keypair: &Keypair) -> String {
        serde_json::to_string(&keypair.to_bytes().to_vec()).expect("json bytes")
    }

    #[test]
    fn parses_base58_json_and_comma_forms() {
        let keypair = Keypair::new();
        let bytes = keypair.to_bytes();

        let from_base58 = parse_keypair_string(&bs58::encode(bytes).into_string()).expect("base58");
        assert_eq!(from_base58.pubkey(), keypair.pubkey());

        let from_json = parse_keypair_string(&keypair_json(&keypair)).expect("json");
        assert_eq!(from_json.pubkey(), keypair.pubkey());

        let comma = bytes
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let from_comma = parse_keypair_string(&comma).expect("comma");
        assert_eq!(from_comma.pubkey(), keypair.pubkey());
    }

    #[test]
    fn rejects_empty_and_short_keys() {
        assert!(matches!(parse_keypair_string("   "), Err(KeyError::Empty)));
        assert!(matches!(
            parse_keypair_string("[1,2,3]"),
            Err(KeyError::Keypair(_))
        ));
        assert!(matches!(
            parse_keypair_string("0OIl"),
            Err(KeyError::Decode(_))
        ));
    }

    #[test]
    fn key_file_is_reencoded_to_base58() {
        let keypair = Keypair::new();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{}", keypair_json(&keypair)).expect("write key");

        let encoded = read_key_file(file.path()).expect("read key file");
        assert_eq!(encoded.as_str(), bs58::encode(keypair.to_bytes()).into_string());
    }

    #[test]
    fn malformed_key_file_fails() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write key");
        assert!(matches!(
            read_key_file(file.path()),
            Err(KeyError::Json { .. })
        ));

        let missing = file.path().with_extension("missing");
        assert!(matches!(read_key_file(&missing), Err(KeyError::Read { .. })));
    }

    #[tokio::test]
    async fn paste_flow_reads_hidden_input() {
        let keypair = Keypair::new();
        let encoded = bs58::encode(keypair.to_bytes()).into_string();
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new())
            .with_selection(0)
            .with_secret(format!("  {encoded} "));

        let key = obtain_private_key(&mut prompter).await.expect("key");
        assert_eq!(key.as_str(), encoded);
        assert_eq!(prompter.secret_questions.len(), 1);
    }

    #[tokio::test]
    async fn file_flow_reads_key_file() {
        let keypair = Keypair::new();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{}", keypair_json(&keypair)).expect("write key");

        let mut prompter =
            ScriptedPrompter::new([file.path().display().to_string()]).with_selection(1);
        let key = obtain_private_key(&mut prompter).await.expect("key");
        let parsed = parse_keypair_string(&key).expect("keypair");
        assert_eq!(parsed.pubkey(), keypair.pubkey());
    }
}
