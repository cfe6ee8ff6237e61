//! CLI argument definitions for Tickerlens.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Screen an index (or a ticker list) with Graham and Greenblatt |
//! | `show` | Company profile, fundamentals, verdicts and latest indicators |
//! | `indicators` | Full RSI / MACD series for one ticker |
//! | `universe` | List index members |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--max-workers` | `10` | Concurrent tickers during a scan |
//! | `--cache-ttl-secs` | `3600` | Snapshot cache TTL |
//! | `--range` | `6mo` | Price history window |
//! | `--timeout-ms` | `10000` | Per-request timeout |
//! | `--requests-per-second` | `5` | Outbound rate limit (0 = off) |
//!
//! Unset options fall back to `TICKERLENS_*` environment variables, then
//! to the defaults above.
//!
//! # Examples
//!
//! ```bash
//! # Cheapest IBOVESPA names by both screens, as a table
//! tickerlens scan --index ibovespa --graham cheap --greenblatt cheap --format table
//!
//! # Top 20 S&P 500 names by ROE
//! tickerlens scan --index sp500 --sort roe --limit 20 --pretty
//!
//! # Details for a B3 ticker (suffix added automatically)
//! tickerlens show petr4
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use tickerlens_core::{HistoryRange, Market, SortKey, Verdict};

/// Tickerlens - value screens and technical indicators for IBOVESPA and S&P 500
#[derive(Debug, Parser)]
#[command(
    name = "tickerlens",
    author,
    version,
    about = "Graham / Greenblatt stock screener with RSI and MACD",
    long_about = "Tickerlens pulls fundamentals and daily closes from Yahoo Finance and \
classifies each ticker with two value screens:\n\
\n\
  • Graham: cheap when P/L x P/VP < 22.5\n\
  • Greenblatt Magic Formula: cheap when P/L < 15 and ROE > 15%\n\
\n\
Use 'tickerlens <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Maximum tickers analyzed concurrently.
    #[arg(long, global = true)]
    pub max_workers: Option<usize>,

    /// Snapshot cache time-to-live in seconds.
    #[arg(long, global = true)]
    pub cache_ttl_secs: Option<u64>,

    /// Price history window (5d, 1mo, 3mo, 6mo, 1y, 2y, 5y).
    #[arg(long, global = true)]
    pub range: Option<HistoryRange>,

    /// Request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Outbound request budget; 0 disables throttling.
    #[arg(long, global = true)]
    pub requests_per_second: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// 📊 Screen every member of an index, or the given tickers.
    ///
    /// # Examples
    ///
    ///   tickerlens scan --index ibovespa
    ///   tickerlens scan --index sp500 --graham cheap --sort pe --limit 10
    ///   tickerlens scan --index ibovespa petr4 vale3 itub4
    Scan(ScanArgs),

    /// 🏢 Show company details, fundamentals, verdicts and indicators.
    ///
    /// # Examples
    ///
    ///   tickerlens show WEGE3.SA
    ///   tickerlens show aapl --index sp500
    Show(ShowArgs),

    /// 📈 Print the RSI and MACD series for one ticker.
    ///
    /// # Examples
    ///
    ///   tickerlens indicators PETR4.SA --range 1y
    Indicators(IndicatorsArgs),

    /// 📋 List the members of an index.
    Universe(UniverseArgs),
}

/// Arguments for the `scan` command.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Index to scan (ibovespa, sp500).
    #[arg(long, default_value = "ibovespa")]
    pub index: Market,

    /// Scan only these tickers instead of the whole index.
    pub symbols: Vec<String>,

    /// Keep only tickers with this Graham verdict (cheap, expensive, unknown).
    #[arg(long)]
    pub graham: Option<Verdict>,

    /// Keep only tickers with this Greenblatt verdict.
    #[arg(long)]
    pub greenblatt: Option<Verdict>,

    /// Rank by column, highest first (price, pe, pb, roe).
    #[arg(long)]
    pub sort: Option<SortKey>,

    /// Keep at most this many rows after filtering and sorting.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print per-ticker progress to stderr.
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

/// Arguments for the `show` command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Ticker; bare B3 tickers get `.SA` when the index is ibovespa.
    pub symbol: String,

    #[arg(long, default_value = "ibovespa")]
    pub index: Market,
}

/// Arguments for the `indicators` command.
#[derive(Debug, Args)]
pub struct IndicatorsArgs {
    pub symbol: String,

    #[arg(long, default_value = "ibovespa")]
    pub index: Market,

    /// Print only the last N sessions.
    #[arg(long)]
    pub tail: Option<usize>,
}

/// Arguments for the `universe` command.
#[derive(Debug, Args)]
pub struct UniverseArgs {
    #[arg(long, default_value = "ibovespa")]
    pub index: Market,
}
