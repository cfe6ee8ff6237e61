use thiserror::Error;

use crate::data_source::{SourceError, SourceErrorKind};
use crate::Symbol;

/// Validation and contract errors exposed by `tickerlens-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid history range '{value}', expected one of 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y")]
    InvalidHistoryRange { value: String },
    #[error("invalid market '{value}', expected one of ibovespa, sp500")]
    InvalidMarket { value: String },
    #[error("invalid verdict '{value}', expected one of cheap, expensive, unknown")]
    InvalidVerdict { value: String },
    #[error("invalid sort key '{value}', expected one of price, pe, pb, roe")]
    InvalidSortKey { value: String },

    #[error("invalid RFC 3339 timestamp '{value}'")]
    InvalidTimestamp { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("price series dates must be strictly ascending (violation at index {index})")]
    UnorderedPriceSeries { index: usize },
}

/// Per-ticker fetch failure surfaced by the fetcher and cache layers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("no data for ticker '{symbol}'")]
    NotFound { symbol: Symbol },

    #[error("provider error for '{symbol}': {source}")]
    Provider {
        symbol: Symbol,
        #[source]
        source: SourceError,
    },
}

impl FetchError {
    /// Classify a source error raised while fetching `symbol`.
    pub fn from_source(symbol: &Symbol, error: SourceError) -> Self {
        if error.kind() == SourceErrorKind::NotFound {
            Self::NotFound {
                symbol: symbol.clone(),
            }
        } else {
            Self::Provider {
                symbol: symbol.clone(),
                source: error,
            }
        }
    }

    pub fn symbol(&self) -> &Symbol {
        match self {
            Self::NotFound { symbol } | Self::Provider { symbol, .. } => symbol,
        }
    }

    /// Not-found is terminal; provider faults carry the source's retry hint.
    pub fn retryable(&self) -> bool {
        match self {
            Self::NotFound { .. } => false,
            Self::Provider { source, .. } => source.retryable(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "fetch.not_found",
            Self::Provider { source, .. } => source.code(),
        }
    }
}
