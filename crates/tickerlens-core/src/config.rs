//! Runtime settings with environment overrides.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `TICKERLENS_MAX_WORKERS` | [`ScreenerConfig::max_workers`] | 10 |
//! | `TICKERLENS_CACHE_TTL_SECS` | [`ScreenerConfig::cache_ttl`] | 3600 |
//! | `TICKERLENS_HISTORY_RANGE` | [`ScreenerConfig::history_range`] | `6mo` |
//! | `TICKERLENS_REQUESTS_PER_SECOND` | [`ScreenerConfig::requests_per_second`] | 5 (0 = unlimited) |
//! | `TICKERLENS_TIMEOUT_MS` | [`ScreenerConfig::timeout_ms`] | 10000 |

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::cache::DEFAULT_TTL;
use crate::indicators::IndicatorConfig;
use crate::retry::RetryConfig;
use crate::HistoryRange;

pub const ENV_MAX_WORKERS: &str = "TICKERLENS_MAX_WORKERS";
pub const ENV_CACHE_TTL_SECS: &str = "TICKERLENS_CACHE_TTL_SECS";
pub const ENV_HISTORY_RANGE: &str = "TICKERLENS_HISTORY_RANGE";
pub const ENV_REQUESTS_PER_SECOND: &str = "TICKERLENS_REQUESTS_PER_SECOND";
pub const ENV_TIMEOUT_MS: &str = "TICKERLENS_TIMEOUT_MS";

pub const DEFAULT_MAX_WORKERS: usize = 10;
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key}='{value}' is not valid: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Everything the screener needs to run a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenerConfig {
    /// Upper bound on concurrently analyzed tickers. Always >= 1.
    pub max_workers: usize,
    pub cache_ttl: Duration,
    pub history_range: HistoryRange,
    pub requests_per_second: u32,
    pub timeout_ms: u64,
    pub indicators: IndicatorConfig,
    pub retry: RetryConfig,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            cache_ttl: DEFAULT_TTL,
            history_range: HistoryRange::default(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            indicators: IndicatorConfig::default(),
            retry: RetryConfig::no_retry(),
        }
    }
}

impl ScreenerConfig {
    /// Defaults overridden by whatever `TICKERLENS_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_WORKERS) {
            config = config.with_max_workers(parse_positive(ENV_MAX_WORKERS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_CACHE_TTL_SECS) {
            let secs: u64 = parse_number(ENV_CACHE_TTL_SECS, &raw)?;
            config.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(ENV_HISTORY_RANGE) {
            config.history_range = HistoryRange::from_str(&raw)
                .map_err(|e| ConfigError::invalid(ENV_HISTORY_RANGE, &raw, e.to_string()))?;
        }
        if let Some(raw) = lookup(ENV_REQUESTS_PER_SECOND) {
            config.requests_per_second = parse_number(ENV_REQUESTS_PER_SECOND, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            config.timeout_ms = parse_positive(ENV_TIMEOUT_MS, &raw)?;
        }

        Ok(config)
    }

    /// Zero is clamped to one worker.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_history_range(mut self, range: HistoryRange) -> Self {
        self.history_range = range;
        self
    }

    pub fn with_requests_per_second(mut self, rate: u32) -> Self {
        self.requests_per_second = rate;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_indicators(mut self, indicators: IndicatorConfig) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

fn parse_number<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, raw, e.to_string()))
}

fn parse_positive<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialEq + Default,
    T::Err: std::fmt::Display,
{
    let value: T = parse_number(key, raw)?;
    if value == T::default() {
        return Err(ConfigError::invalid(key, raw, "must be greater than zero"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let config = ScreenerConfig::from_lookup(lookup(&[])).expect("defaults are valid");

        assert_eq!(config, ScreenerConfig::default());
        assert_eq!(config.max_workers, 10);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.history_range, HistoryRange::SixMonths);
        assert_eq!(config.requests_per_second, 5);
        assert!(!config.retry.enabled);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ScreenerConfig::from_lookup(lookup(&[
            (ENV_MAX_WORKERS, "4"),
            (ENV_CACHE_TTL_SECS, "60"),
            (ENV_HISTORY_RANGE, "1y"),
            (ENV_REQUESTS_PER_SECOND, "0"),
            (ENV_TIMEOUT_MS, "2500"),
        ]))
        .expect("valid overrides");

        assert_eq!(config.max_workers, 4);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.history_range, HistoryRange::OneYear);
        assert_eq!(config.requests_per_second, 0);
        assert_eq!(config.timeout_ms, 2500);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (key, value) in [
            (ENV_MAX_WORKERS, "0"),
            (ENV_MAX_WORKERS, "many"),
            (ENV_HISTORY_RANGE, "10y"),
            (ENV_TIMEOUT_MS, "-1"),
        ] {
            let error = ScreenerConfig::from_lookup(lookup(&[(key, value)]))
                .expect_err("invalid value must fail");
            assert!(matches!(error, ConfigError::InvalidValue { key: k, .. } if k == key));
        }
    }

    #[test]
    fn zero_workers_clamps_to_one() {
        assert_eq!(ScreenerConfig::default().with_max_workers(0).max_workers, 1);
    }
}
