//! Market data source contract and its error type.
//!
//! The pipeline treats the provider as a black box with two capabilities:
//!
//! | Method | Returns | Description |
//! |--------|---------|-------------|
//! | [`quote_summary`](MarketDataSource::quote_summary) | [`Fundamentals`] | Ratios and company profile |
//! | [`history`](MarketDataSource::history) | [`PriceSeries`] | Daily closes over a [`HistoryRange`] |
//!
//! Failures are classified by [`SourceErrorKind`] so callers can tell an
//! unknown ticker from a transient provider fault.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{Fundamentals, HistoryRange, PriceSeries, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The provider does not know the ticker.
    NotFound,
    Unavailable,
    RateLimited,
    Timeout,
    /// The provider answered with something we could not interpret.
    InvalidResponse,
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::InvalidResponse => "source.invalid_response",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Market data provider contract.
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// scan worker. Adapters never retry on their own; retry policy belongs to
/// the scan orchestrator.
pub trait MarketDataSource: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Fetches trailing ratios and company metadata.
    ///
    /// # Errors
    ///
    /// [`SourceErrorKind::NotFound`] when the ticker is unknown; any other kind
    /// for transport, throttling or payload problems.
    fn quote_summary<'a>(&'a self, symbol: &'a Symbol) -> SourceFuture<'a, Fundamentals>;

    /// Fetches daily closes covering `range`, oldest first.
    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        range: HistoryRange,
    ) -> SourceFuture<'a, PriceSeries>;
}
