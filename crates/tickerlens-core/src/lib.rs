//! # Tickerlens Core
//!
//! Fundamentals, technical indicators and value screens for IBOVESPA and
//! S&P 500 tickers.
//!
//! ## Overview
//!
//! - **Quote fetching** of ratios, company profile and daily closes from Yahoo Finance
//! - **Snapshot cache** with per-ticker single-flight and explicit TTL
//! - **Indicators**: Wilder RSI and MACD, latest value or full series
//! - **Valuation**: Graham (`P/L x P/VP < 22.5`) and Greenblatt
//!   (`P/L < 15`, `ROE > 15%`) screens
//! - **Parallel scans** bounded by a worker limit, with per-ticker failure isolation
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo Finance adapter and crumb session handling |
//! | [`cache`] | [`SnapshotCache`] keyed by [`Symbol`] |
//! | [`config`] | [`ScreenerConfig`] and `TICKERLENS_*` overrides |
//! | [`data_source`] | [`MarketDataSource`] trait and [`SourceError`] |
//! | [`domain`] | Validated domain types |
//! | [`error`] | [`ValidationError`] and [`FetchError`] |
//! | [`fetcher`] | [`QuoteFetcher`]: one ticker, one snapshot |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`indicators`] | RSI, EMA and MACD |
//! | [`report`] | [`ScanReport`], summaries and screen filters |
//! | [`retry`] | Optional backoff for transient failures |
//! | [`scan`] | [`Screener`]: parallel scan orchestration |
//! | [`throttling`] | Outbound request rate limit |
//! | [`universe`] | Index membership tables |
//! | [`valuation`] | Graham and Greenblatt verdicts |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickerlens_core::{Market, Screener, ScreenerConfig, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScreenerConfig::from_env()?;
//!     let screener = Screener::from_config(Arc::new(YahooAdapter::default()), config);
//!
//!     let report = screener.scan(&Market::Ibovespa.symbols()?).await;
//!     for analysis in report.analyses().filter(|a| a.is_double_cheap()) {
//!         println!("{} {:?}", analysis.symbol, analysis.last_price);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI            │
//! └────────┬────────┘
//!          │ scan / analyze
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Screener        │────▶│ Indicators       │
//! │ (JoinSet +      │     │ Valuation        │
//! │  Semaphore)     │     └──────────────────┘
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐
//! │ SnapshotCache   │
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ QuoteFetcher    │────▶│ RequestThrottle  │
//! └────────┬────────┘     └──────────────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ MarketDataSource│────▶│ HttpClient       │
//! │ (YahooAdapter)  │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Fetch failures are split into terminal and transient:
//!
//! ```rust
//! use tickerlens_core::FetchError;
//!
//! fn describe(error: &FetchError) -> &'static str {
//!     match error {
//!         FetchError::NotFound { .. } => "unknown ticker",
//!         FetchError::Provider { .. } if error.retryable() => "try again later",
//!         FetchError::Provider { .. } => "provider error",
//!     }
//! }
//! ```
//!
//! A scan never fails as a whole; each ticker ends up as either a
//! [`TickerAnalysis`] or a [`ScanFailure`].

pub mod adapters;
pub mod cache;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod indicators;
pub mod report;
pub mod retry;
pub mod scan;
pub mod throttling;
pub mod universe;
pub mod valuation;

// Adapter implementations
pub use adapters::{YahooAdapter, YahooAuthManager};

// Caching
pub use cache::{CacheMode, CacheStats, SnapshotCache};

// Configuration
pub use config::{ConfigError, ScreenerConfig};

// Data source trait and types
pub use data_source::{MarketDataSource, SourceError, SourceErrorKind, SourceFuture};

// Domain models
pub use domain::{
    CompanyProfile, Fundamentals, HistoryRange, Officer, PricePoint, PriceSeries, Symbol,
    TickerSnapshot, UtcDateTime, ValuationRatios, B3_SUFFIX,
};

// Error types
pub use error::{FetchError, ValidationError};

pub use fetcher::QuoteFetcher;

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, ReqwestHttpClient};

// Indicators
pub use indicators::{IndicatorConfig, IndicatorError, IndicatorResult, MacdPoint, RsiZone};

// Scan results
pub use report::{
    ScanEntry, ScanFailure, ScanReport, ScanSummary, ScreenFilter, SortKey, TickerAnalysis,
};

// Retry logic
pub use retry::{Backoff, RetryConfig};

pub use scan::{ScanProgress, Screener};

pub use throttling::RequestThrottle;

pub use universe::Market;

pub use valuation::{ValuationVerdict, Verdict};
