//! In-memory snapshot cache with per-ticker single-flight fetches.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::{FetchError, Symbol, TickerSnapshot};

/// One hour, matching how often fundamentals move in practice.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Defines how a lookup interacts with the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Serve a fresh entry if present; otherwise fetch and store. (Default)
    #[default]
    Use,
    /// Always fetch and overwrite whatever was stored.
    Refresh,
    /// Fetch without reading or writing the cache.
    Bypass,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Arc<TickerSnapshot>,
    stored_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

type Slot = Arc<tokio::sync::Mutex<Option<CacheEntry>>>;

#[derive(Debug)]
struct CacheInner {
    slots: Mutex<HashMap<Symbol, Slot>>,
    default_ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Hit/miss counters and current size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Thread-safe cache of [`TickerSnapshot`]s keyed by [`Symbol`].
///
/// Each ticker owns an async slot lock. The first caller for a cold or stale
/// ticker fetches while holding it; concurrent callers for the same ticker
/// wait and then read the stored result, so one provider call serves them
/// all. Failed fetches store nothing. The outer map lock is only held long
/// enough to find or create a slot, never across a fetch.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    inner: Arc<CacheInner>,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl SnapshotCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                slots: Mutex::new(HashMap::new()),
                default_ttl,
                hits: AtomicU64::new(0),
                misses: AtomicU64::new(0),
            }),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.inner.default_ttl
    }

    /// Cached snapshot for `symbol` if younger than `ttl`, else the result of
    /// `fetch`, stored on success.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        symbol: &Symbol,
        ttl: Duration,
        fetch: F,
    ) -> Result<Arc<TickerSnapshot>, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TickerSnapshot, FetchError>>,
    {
        self.get_or_fetch_with_mode(symbol, ttl, CacheMode::Use, fetch)
            .await
    }

    pub async fn get_or_fetch_with_mode<F, Fut>(
        &self,
        symbol: &Symbol,
        ttl: Duration,
        mode: CacheMode,
        fetch: F,
    ) -> Result<Arc<TickerSnapshot>, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TickerSnapshot, FetchError>>,
    {
        if mode == CacheMode::Bypass {
            self.inner.misses.fetch_add(1, Ordering::Relaxed);
            return fetch().await.map(Arc::new);
        }

        let slot = self.slot(symbol);
        let mut guard = slot.lock().await;

        if mode == CacheMode::Use {
            if let Some(entry) = guard.as_ref().filter(|entry| entry.is_fresh(ttl)) {
                self.inner.hits.fetch_add(1, Ordering::Relaxed);
                debug!(symbol = %symbol, "snapshot cache hit");
                return Ok(Arc::clone(&entry.snapshot));
            }
        }

        self.inner.misses.fetch_add(1, Ordering::Relaxed);
        debug!(symbol = %symbol, ?mode, "snapshot cache miss");

        let snapshot = match fetch().await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(error) => {
                let was_empty = guard.is_none();
                drop(guard);
                if was_empty {
                    self.forget_if_idle(symbol, &slot);
                }
                return Err(error);
            }
        };
        *guard = Some(CacheEntry {
            snapshot: Arc::clone(&snapshot),
            stored_at: Instant::now(),
        });
        Ok(snapshot)
    }

    /// Stored snapshot younger than `ttl`, without fetching.
    pub async fn peek(&self, symbol: &Symbol, ttl: Duration) -> Option<Arc<TickerSnapshot>> {
        let slot = self.lock_slots().get(symbol).cloned()?;
        let guard = slot.lock().await;
        guard
            .as_ref()
            .filter(|entry| entry.is_fresh(ttl))
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Forget `symbol`. A fetch already in flight finishes but its result is
    /// not visible to later lookups.
    pub fn invalidate(&self, symbol: &Symbol) -> bool {
        self.lock_slots().remove(symbol).is_some()
    }

    /// Drop entries older than the default TTL. Slots another caller holds
    /// or is fetching into are left alone.
    pub fn clear_expired(&self) {
        let ttl = self.inner.default_ttl;
        self.lock_slots().retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(guard) => guard.as_ref().is_some_and(|entry| entry.is_fresh(ttl)),
                Err(_) => true,
            }
        });
    }

    pub fn clear(&self) {
        self.lock_slots().clear();
    }

    /// Number of stored snapshots, expired ones included.
    pub async fn len(&self) -> usize {
        let slots: Vec<Slot> = self.lock_slots().values().cloned().collect();
        let mut stored = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                stored += 1;
            }
        }
        stored
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.inner.hits.load(Ordering::Relaxed),
            misses: self.inner.misses.load(Ordering::Relaxed),
            entries: self.len().await,
        }
    }

    fn slot(&self, symbol: &Symbol) -> Slot {
        Arc::clone(self.lock_slots().entry(symbol.clone()).or_default())
    }

    /// Remove `slot` after a failed fetch unless it was replaced, refilled
    /// or picked up by a waiting caller. The map and the caller hold the only
    /// references when it is idle.
    fn forget_if_idle(&self, symbol: &Symbol, slot: &Slot) {
        let mut slots = self.lock_slots();
        let idle = slots.get(symbol).is_some_and(|current| {
            Arc::ptr_eq(current, slot)
                && Arc::strong_count(slot) == 2
                && slot.try_lock().is_ok_and(|guard| guard.is_none())
        });
        if idle {
            slots.remove(symbol);
        }
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<Symbol, Slot>> {
        // Holders never panic mid-update; the map is consistent even if poisoned.
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
