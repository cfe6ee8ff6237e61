//! Parallel scan orchestration.
//!
//! Each ticker runs `cache -> fetch -> indicators -> verdict` as one unit.
//! Units are spawned on a [`JoinSet`] and gated by a [`Semaphore`] so at most
//! `max_workers` run at once. A unit that errors or panics becomes a
//! [`ScanFailure`]; [`Screener::scan`] itself cannot fail.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::{CacheMode, SnapshotCache};
use crate::config::ScreenerConfig;
use crate::data_source::MarketDataSource;
use crate::fetcher::QuoteFetcher;
use crate::report::{ScanEntry, ScanFailure, ScanReport, TickerAnalysis};
use crate::throttling::RequestThrottle;
use crate::{FetchError, Symbol, UtcDateTime};

/// Emitted once per finished ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanProgress {
    pub completed: usize,
    pub total: usize,
    pub symbol: Symbol,
    pub ok: bool,
}

struct ScreenerInner {
    fetcher: QuoteFetcher,
    cache: SnapshotCache,
    config: ScreenerConfig,
}

/// Entry point for scans and single-ticker analysis. Cheap to clone.
#[derive(Clone)]
pub struct Screener {
    inner: Arc<ScreenerInner>,
}

impl Screener {
    pub fn new(fetcher: QuoteFetcher, cache: SnapshotCache, config: ScreenerConfig) -> Self {
        Self {
            inner: Arc::new(ScreenerInner {
                fetcher,
                cache,
                config,
            }),
        }
    }

    /// Wire a fetcher and cache for `source` from `config`.
    pub fn from_config(source: Arc<dyn MarketDataSource>, config: ScreenerConfig) -> Self {
        let throttle = RequestThrottle::per_second(config.requests_per_second);
        Self::from_config_with_throttle(source, config, throttle)
    }

    /// Like [`Screener::from_config`], drawing on a budget `source` may also use.
    pub fn from_config_with_throttle(
        source: Arc<dyn MarketDataSource>,
        config: ScreenerConfig,
        throttle: RequestThrottle,
    ) -> Self {
        let fetcher = QuoteFetcher::new(source)
            .with_range(config.history_range)
            .with_throttle(throttle);
        let cache = SnapshotCache::new(config.cache_ttl);
        Self::new(fetcher, cache, config)
    }

    pub fn config(&self) -> &ScreenerConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.inner.cache
    }

    /// Analyze a single ticker through the cache.
    pub async fn analyze(&self, symbol: &Symbol) -> Result<TickerAnalysis, FetchError> {
        self.analyze_with_mode(symbol, CacheMode::Use).await
    }

    pub async fn analyze_with_mode(
        &self,
        symbol: &Symbol,
        mode: CacheMode,
    ) -> Result<TickerAnalysis, FetchError> {
        let inner = &self.inner;
        let ttl = inner.config.cache_ttl;

        let snapshot = inner
            .config
            .retry
            .run(|| {
                inner
                    .cache
                    .get_or_fetch_with_mode(symbol, ttl, mode, || inner.fetcher.fetch(symbol))
            })
            .await?;

        Ok(TickerAnalysis::from_snapshot(
            snapshot,
            &inner.config.indicators,
        ))
    }

    pub async fn scan(&self, symbols: &[Symbol]) -> ScanReport {
        self.scan_with_progress(symbols, None).await
    }

    /// Scan `symbols` with at most `max_workers` units in flight.
    ///
    /// Duplicate symbols are analyzed once. When `progress` is given, one
    /// [`ScanProgress`] is sent per finished ticker; a dropped receiver is
    /// ignored.
    pub async fn scan_with_progress(
        &self,
        symbols: &[Symbol],
        progress: Option<mpsc::UnboundedSender<ScanProgress>>,
    ) -> ScanReport {
        let scan_id = Uuid::new_v4();
        let started_at = UtcDateTime::now();
        let clock = Instant::now();

        let mut seen = HashSet::new();
        let symbols: Vec<Symbol> = symbols
            .iter()
            .filter(|symbol| seen.insert((*symbol).clone()))
            .cloned()
            .collect();
        let total = symbols.len();
        let max_workers = self.inner.config.max_workers.max(1);

        info!(%scan_id, tickers = total, max_workers, "scan started");

        let semaphore = Arc::new(Semaphore::new(max_workers));
        let mut tasks = JoinSet::new();

        for symbol in symbols.iter().cloned() {
            let screener = self.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return ScanEntry::Failed(ScanFailure::aborted(symbol));
                };
                let unit = AssertUnwindSafe(screener.analyze(&symbol)).catch_unwind();
                match unit.await {
                    Ok(Ok(analysis)) => ScanEntry::Analyzed(analysis),
                    Ok(Err(error)) => ScanEntry::Failed(ScanFailure::from_fetch_error(&error)),
                    Err(payload) => {
                        ScanEntry::Failed(ScanFailure::panicked(symbol, &panic_detail(payload.as_ref())))
                    }
                }
            });
        }

        let mut entries = Vec::with_capacity(total);
        let mut finished = HashSet::with_capacity(total);

        while let Some(joined) = tasks.join_next().await {
            let entry = match joined {
                Ok(entry) => entry,
                Err(error) => {
                    // Panics are caught inside the unit; this only covers
                    // cancellation, and the symbol is recovered below.
                    warn!(%scan_id, error = %error, "scan unit did not complete");
                    continue;
                }
            };
            self.record(scan_id, &entry);
            finished.insert(entry.symbol().clone());
            notify(&progress, &entry, entries.len() + 1, total);
            entries.push(entry);
        }

        for symbol in symbols {
            if !finished.contains(&symbol) {
                let entry = ScanEntry::Failed(ScanFailure::aborted(symbol));
                self.record(scan_id, &entry);
                notify(&progress, &entry, entries.len() + 1, total);
                entries.push(entry);
            }
        }

        let report = ScanReport {
            scan_id,
            started_at,
            elapsed_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
            entries,
        };

        let summary = report.summary();
        info!(
            %scan_id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_ms = report.elapsed_ms,
            "scan finished"
        );
        report
    }

    fn record(&self, scan_id: Uuid, entry: &ScanEntry) {
        match entry {
            ScanEntry::Analyzed(analysis) => {
                debug!(%scan_id, symbol = %analysis.symbol, "ticker analyzed");
            }
            ScanEntry::Failed(failure) => {
                warn!(
                    %scan_id,
                    symbol = %failure.symbol,
                    code = %failure.code,
                    "ticker failed: {}",
                    failure.message
                );
            }
        }
    }
}

impl std::fmt::Debug for Screener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screener")
            .field("fetcher", &self.inner.fetcher)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

fn notify(
    progress: &Option<mpsc::UnboundedSender<ScanProgress>>,
    entry: &ScanEntry,
    completed: usize,
    total: usize,
) {
    if let Some(sender) = progress {
        let _ = sender.send(ScanProgress {
            completed,
            total,
            symbol: entry.symbol().clone(),
            ok: entry.is_ok(),
        });
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("unknown panic"))
}
