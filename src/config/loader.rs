use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::{DEFAULT_RPC_URL, RPC_URL_ENV, RentsweepConfig};

pub const DEFAULT_CONFIG_PATHS: &[&str] = &["rentsweep.toml", "config/rentsweep.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config file not found: {0}")]
    Missing(PathBuf),
}

/// 显式指定的路径必须存在；默认路径缺失时退回内置默认值。
pub fn load_config(path: Option<PathBuf>) -> Result<RentsweepConfig, ConfigError> {
    if let Some(explicit) = path {
        return try_load_file(&explicit)?.ok_or(ConfigError::Missing(explicit));
    }

    for candidate in DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from) {
        if let Some(config) = try_load_file(&candidate)? {
            return Ok(config);
        }
    }

    Ok(RentsweepConfig::default())
}

fn try_load_file(path: &Path) -> Result<Option<RentsweepConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config: RentsweepConfig =
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(target: "config", path = %path.display(), "已加载配置文件");
    Ok(Some(config))
}

/// 环境变量优先，其次配置文件，最后主网公共节点。
pub fn resolve_rpc_url(config: &RentsweepConfig) -> String {
    env::var(RPC_URL_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| config.global.rpc_url.clone())
        .unwrap_or_else(|| DEFAULT_RPC_URL.to_string())
}
