use std::sync::Arc;

use anyhow::{Result, anyhow};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use tracing::{info, warn};

use crate::api::DexscreenerClient;
use crate::cli::console_ui::{ConsolePrompter, restore_terminal};
use crate::config::{RentsweepConfig, resolve_rpc_url};
use crate::engine::{EngineError, EngineResult, Prompter, SweepOutcome, SweepSession, Tone};
use crate::lookup::LiveTokenInfo;

const INTERRUPTED_MESSAGE: &str = "\nProcess interrupted. Exiting...";

pub async fn run(config: RentsweepConfig) -> Result<()> {
    let rpc_url = resolve_rpc_url(&config);
    info!(target: "cli", rpc_url = %rpc_url, "使用 RPC 节点");
    let rpc = Arc::new(RpcClient::new_with_commitment(
        rpc_url,
        CommitmentConfig::confirmed(),
    ));

    let http = reqwest::Client::builder()
        .user_agent(concat!("rentsweep/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| anyhow!("构建 HTTP 客户端失败: {err}"))?;
    let prices = DexscreenerClient::new(http, &config.price_api);
    let token_info = Arc::new(LiveTokenInfo::new(prices, rpc.clone()));

    let mut prompter = ConsolePrompter::new();
    let session = SweepSession::new(rpc, token_info, config.sweep.clone())
        .with_progress(prompter.is_interactive());

    let result = tokio::select! {
        res = session.run(&mut prompter) => res,
        _ = tokio::signal::ctrl_c() => Err(EngineError::Interrupted),
    };

    match exit_policy(result) {
        ExitAction::Finished(outcome) => {
            log_outcome(&outcome);
            Ok(())
        }
        ExitAction::Interrupted => {
            restore_terminal();
            eprintln!("{INTERRUPTED_MESSAGE}");
            // 终端读取阻塞在 blocking 线程上，运行时无法等待其结束。
            std::process::exit(0);
        }
        ExitAction::Reported(err) => {
            if let EngineError::Simulation { logs, .. } = &err {
                for line in logs {
                    warn!(target: "cli", log = %line, "模拟日志");
                }
            }
            prompter.notify(Tone::Failure, &format!("\nAn error occurred: {err}"));
            Ok(())
        }
        ExitAction::Failed(err) => Err(err.into()),
    }
}

/// 一次运行结束后的处理方式；只有 `Failed` 以非零状态退出。
#[derive(Debug)]
enum ExitAction {
    Finished(SweepOutcome),
    Interrupted,
    Reported(EngineError),
    Failed(EngineError),
}

fn exit_policy(result: EngineResult<SweepOutcome>) -> ExitAction {
    match result {
        Ok(outcome) => ExitAction::Finished(outcome),
        Err(EngineError::Interrupted) => ExitAction::Interrupted,
        Err(err) if err.is_recognized() => ExitAction::Reported(err),
        Err(err) => ExitAction::Failed(err),
    }
}

fn log_outcome(outcome: &SweepOutcome) {
    match outcome {
        SweepOutcome::NothingToClose => info!(target: "cli", "没有需要关闭的账户"),
        SweepOutcome::Cancelled => info!(target: "cli", "用户取消提交"),
        SweepOutcome::Submitted {
            signature,
            accounts_closed,
            reclaimed_lamports,
        } => info!(
            target: "cli",
            %signature,
            accounts_closed,
            reclaimed_lamports,
            "清理交易已确认"
        ),
    }
}
