use std::sync::Arc;

use tracing::debug;

use crate::data_source::MarketDataSource;
use crate::throttling::RequestThrottle;
use crate::{FetchError, HistoryRange, Symbol, TickerSnapshot, UtcDateTime};

/// Pulls fundamentals and price history for one ticker.
///
/// Both upstream calls run concurrently and each waits on the shared
/// [`RequestThrottle`] first. There is no retry here.
#[derive(Clone)]
pub struct QuoteFetcher {
    source: Arc<dyn MarketDataSource>,
    range: HistoryRange,
    throttle: RequestThrottle,
}

impl QuoteFetcher {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            source,
            range: HistoryRange::default(),
            throttle: RequestThrottle::unlimited(),
        }
    }

    pub fn with_range(mut self, range: HistoryRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_throttle(mut self, throttle: RequestThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn range(&self) -> HistoryRange {
        self.range
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// # Errors
    ///
    /// [`FetchError::NotFound`] when the provider does not know `symbol`,
    /// [`FetchError::Provider`] for anything else that went wrong upstream.
    pub async fn fetch(&self, symbol: &Symbol) -> Result<TickerSnapshot, FetchError> {
        debug!(symbol = %symbol, source = self.source.name(), range = %self.range, "fetching snapshot");

        let fundamentals = async {
            self.throttle.acquire().await;
            self.source.quote_summary(symbol).await
        };
        let prices = async {
            self.throttle.acquire().await;
            self.source.history(symbol, self.range).await
        };

        let (fundamentals, prices) = tokio::try_join!(fundamentals, prices)
            .map_err(|error| FetchError::from_source(symbol, error))?;

        Ok(TickerSnapshot {
            symbol: symbol.clone(),
            fundamentals,
            prices,
            fetched_at: UtcDateTime::now(),
        })
    }
}

impl std::fmt::Debug for QuoteFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuoteFetcher")
            .field("source", &self.source.name())
            .field("range", &self.range)
            .field("throttle", &self.throttle)
            .finish()
    }
}
