use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Outbound request budget shared by every scan worker.
///
/// Workers wait for a cell before each upstream call, so a full-index scan
/// never bursts past the configured rate no matter how many workers run.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Option<Arc<DirectRateLimiter>>,
}

impl RequestThrottle {
    /// `requests_per_second == 0` disables throttling.
    pub fn per_second(requests_per_second: u32) -> Self {
        let limiter = NonZeroU32::new(requests_per_second)
            .map(|rate| Arc::new(RateLimiter::direct(Quota::per_second(rate))));
        Self { limiter }
    }

    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    pub fn is_limited(&self) -> bool {
        self.limiter.is_some()
    }

    /// Suspends until the budget allows one more request.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    /// Consumes a cell when one is available, without waiting.
    #[cfg(test)]
    pub(crate) fn try_acquire(&self) -> bool {
        match &self.limiter {
            Some(limiter) => limiter.check().is_ok(),
            None => true,
        }
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle")
            .field("limited", &self.is_limited())
            .finish()
    }
}
