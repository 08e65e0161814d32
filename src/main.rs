use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod api;
mod cli;
mod config;
mod engine;
mod instructions;
mod lookup;
mod rpc;
mod wallet;

use cli::args::Cli;
use config::{ConfigError, RentsweepConfig, load_config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_configuration(cli)?;
    init_tracing(&config.global.logging)?;
    cli::run(config).await
}

fn init_tracing(config: &config::LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if config.json {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn load_configuration(cli: Cli) -> Result<RentsweepConfig, ConfigError> {
    load_config(cli.config)
}
