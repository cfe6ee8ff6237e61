//! Scan results, statistics and screen filtering.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::indicators::{IndicatorConfig, IndicatorResult};
use crate::valuation::{ValuationVerdict, Verdict};
use crate::{FetchError, Symbol, TickerSnapshot, UtcDateTime, ValidationError, ValuationRatios};

/// Complete analysis of one ticker.
#[derive(Debug, Clone, Serialize)]
pub struct TickerAnalysis {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub last_price: Option<f64>,
    pub ratios: ValuationRatios,
    pub indicators: IndicatorResult,
    pub verdict: ValuationVerdict,
    pub fetched_at: UtcDateTime,
    /// Full fetched record, shared with the cache.
    #[serde(skip)]
    pub snapshot: Arc<TickerSnapshot>,
}

impl TickerAnalysis {
    pub fn from_snapshot(snapshot: Arc<TickerSnapshot>, config: &IndicatorConfig) -> Self {
        let ratios = snapshot.fundamentals.ratios;
        Self {
            symbol: snapshot.symbol.clone(),
            name: snapshot.fundamentals.profile.name.clone(),
            currency: snapshot.fundamentals.currency.clone(),
            last_price: snapshot.last_price(),
            ratios,
            indicators: IndicatorResult::compute(&snapshot.prices, config),
            verdict: ValuationVerdict::classify(&ratios),
            fetched_at: snapshot.fetched_at,
            snapshot,
        }
    }

    pub fn is_double_cheap(&self) -> bool {
        self.verdict.is_double_cheap()
    }

    fn sort_value(&self, key: SortKey) -> Option<f64> {
        match key {
            SortKey::Price => self.last_price,
            SortKey::Pe => self.ratios.pe_ratio,
            SortKey::Pb => self.ratios.price_to_book,
            SortKey::Roe => self.ratios.return_on_equity,
        }
    }
}

/// Failure marker for a ticker that could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub symbol: Symbol,
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl ScanFailure {
    pub fn from_fetch_error(error: &FetchError) -> Self {
        Self {
            symbol: error.symbol().clone(),
            code: error.code().to_owned(),
            message: error.to_string(),
            retryable: error.retryable(),
        }
    }

    pub fn panicked(symbol: Symbol, detail: &str) -> Self {
        Self {
            message: format!("analysis of '{symbol}' panicked: {detail}"),
            symbol,
            code: String::from("scan.panicked"),
            retryable: false,
        }
    }

    pub fn aborted(symbol: Symbol) -> Self {
        Self {
            message: format!("analysis of '{symbol}' did not complete"),
            symbol,
            code: String::from("scan.aborted"),
            retryable: true,
        }
    }
}

/// One ticker's outcome: a full analysis or a failure, never anything in
/// between.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanEntry {
    Analyzed(TickerAnalysis),
    Failed(ScanFailure),
}

impl ScanEntry {
    pub fn symbol(&self) -> &Symbol {
        match self {
            Self::Analyzed(analysis) => &analysis.symbol,
            Self::Failed(failure) => &failure.symbol,
        }
    }

    pub fn analysis(&self) -> Option<&TickerAnalysis> {
        match self {
            Self::Analyzed(analysis) => Some(analysis),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ScanFailure> {
        match self {
            Self::Analyzed(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Analyzed(_))
    }
}

/// Aggregate counts over a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub graham_cheap: usize,
    pub greenblatt_cheap: usize,
    pub both_cheap: usize,
}

/// Column to rank screen results by. Ranking is descending; tickers
/// missing the value go last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Price,
    Pe,
    Pb,
    Roe,
}

impl SortKey {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Pe => "pe",
            Self::Pb => "pb",
            Self::Roe => "roe",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "pe" | "p/l" => Ok(Self::Pe),
            "pb" | "p/vp" => Ok(Self::Pb),
            "roe" => Ok(Self::Roe),
            _ => Err(ValidationError::InvalidSortKey {
                value: value.to_owned(),
            }),
        }
    }
}

/// Verdict filters, ordering and truncation applied to successful entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenFilter {
    pub graham: Option<Verdict>,
    pub greenblatt: Option<Verdict>,
    /// `None` keeps arrival order.
    pub sort: Option<SortKey>,
    pub limit: Option<usize>,
}

impl ScreenFilter {
    fn accepts(&self, analysis: &TickerAnalysis) -> bool {
        self.graham.is_none_or(|v| analysis.verdict.graham == v)
            && self
                .greenblatt
                .is_none_or(|v| analysis.verdict.greenblatt == v)
    }
}

/// Result of one scan. Entries are in completion order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub started_at: UtcDateTime,
    pub elapsed_ms: u64,
    pub entries: Vec<ScanEntry>,
}

impl ScanReport {
    pub fn get(&self, symbol: &Symbol) -> Option<&ScanEntry> {
        self.entries.iter().find(|entry| entry.symbol() == symbol)
    }

    pub fn analyses(&self) -> impl Iterator<Item = &TickerAnalysis> {
        self.entries.iter().filter_map(ScanEntry::analysis)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScanFailure> {
        self.entries.iter().filter_map(ScanEntry::failure)
    }

    pub fn summary(&self) -> ScanSummary {
        self.entries
            .iter()
            .fold(ScanSummary::default(), |mut summary, entry| {
                summary.total += 1;
                match entry {
                    ScanEntry::Analyzed(analysis) => {
                        summary.succeeded += 1;
                        summary.graham_cheap += usize::from(analysis.verdict.graham.is_cheap());
                        summary.greenblatt_cheap +=
                            usize::from(analysis.verdict.greenblatt.is_cheap());
                        summary.both_cheap += usize::from(analysis.is_double_cheap());
                    }
                    ScanEntry::Failed(_) => summary.failed += 1,
                }
                summary
            })
    }

    /// Successful analyses passing `filter`, ranked and truncated.
    pub fn screen(&self, filter: &ScreenFilter) -> Vec<&TickerAnalysis> {
        let mut rows: Vec<&TickerAnalysis> =
            self.analyses().filter(|a| filter.accepts(a)).collect();

        if let Some(key) = filter.sort {
            // Stable: ties keep arrival order.
            rows.sort_by(|a, b| descending_missing_last(a.sort_value(key), b.sort_value(key)));
        }
        if let Some(limit) = filter.limit {
            rows.truncate(limit);
        }
        rows
    }
}

fn descending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
