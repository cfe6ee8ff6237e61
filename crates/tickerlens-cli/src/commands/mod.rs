mod indicators;
mod scan;
mod show;
mod universe;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tickerlens_core::{RequestThrottle, Screener, ScreenerConfig, YahooAdapter};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Table;

/// What a command produced: the JSON payload and its table rendering.
pub struct CommandResult {
    pub data: Value,
    pub tables: Vec<Table>,
}

impl CommandResult {
    pub fn new(data: Value, table: Table) -> Self {
        Self {
            data,
            tables: vec![table],
        }
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    match &cli.command {
        Command::Universe(args) => universe::run(args),
        Command::Scan(args) => scan::run(args, &build_screener(cli)?).await,
        Command::Show(args) => show::run(args, &build_screener(cli)?).await,
        Command::Indicators(args) => indicators::run(args, &build_screener(cli)?).await,
    }
}

/// Environment first, then command-line flags on top.
fn build_config(cli: &Cli) -> Result<ScreenerConfig, CliError> {
    let mut config = ScreenerConfig::from_env()?;

    if let Some(max_workers) = cli.max_workers {
        config = config.with_max_workers(max_workers);
    }
    if let Some(secs) = cli.cache_ttl_secs {
        config = config.with_cache_ttl(Duration::from_secs(secs));
    }
    if let Some(range) = cli.range {
        config = config.with_history_range(range);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }
    if let Some(rate) = cli.requests_per_second {
        config = config.with_requests_per_second(rate);
    }

    Ok(config)
}

fn build_screener(cli: &Cli) -> Result<Screener, CliError> {
    let config = build_config(cli)?;
    debug!(?config, "screener configuration");

    let throttle = RequestThrottle::per_second(config.requests_per_second);
    let adapter = YahooAdapter::default()
        .with_timeout_ms(config.timeout_ms)
        .with_throttle(throttle.clone());
    Ok(Screener::from_config_with_throttle(
        Arc::new(adapter),
        config,
        throttle,
    ))
}
