//! Snapshot cache behavior seen from the outside: single-flight cold
//! lookups, expiry, failures and per-ticker isolation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tickerlens_core::{
    CacheMode, FetchError, Fundamentals, PriceSeries, SnapshotCache, SourceError, Symbol,
    TickerSnapshot, UtcDateTime,
};

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn snapshot(symbol: &Symbol) -> TickerSnapshot {
    let now = UtcDateTime::now();
    TickerSnapshot {
        symbol: symbol.clone(),
        fundamentals: Fundamentals::empty(symbol.clone(), now),
        prices: PriceSeries::from_unordered(symbol.clone(), Vec::new()),
        fetched_at: now,
    }
}

#[tokio::test]
async fn concurrent_cold_lookups_fetch_once() {
    // Given an empty cache and twenty callers asking for the same ticker
    let cache = &SnapshotCache::default();
    let petr = &symbol("PETR4.SA");
    let fetches = &AtomicUsize::new(0);

    // When they all arrive before the first fetch completes
    let lookups = (0..20).map(move |_| {
        cache.get_or_fetch(petr, Duration::from_secs(60), move || async move {
            fetches.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(snapshot(&symbol("PETR4.SA")))
        })
    });
    let results = join_all(lookups).await;

    // Then one upstream fetch served every caller the same snapshot
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    let first = results[0].as_ref().expect("fetch succeeds");
    for result in &results {
        let shared = result.as_ref().expect("fetch succeeds");
        assert!(Arc::ptr_eq(first, shared));
    }

    let stats = cache.stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 19);
    assert_eq!(stats.entries, 1);
}

#[tokio::test]
async fn expired_entries_are_refetched() {
    let cache = SnapshotCache::new(Duration::from_millis(30));
    let vale = symbol("VALE3.SA");
    let fetches = &AtomicUsize::new(0);
    let fetch = || async move {
        fetches.fetch_add(1, Ordering::SeqCst);
        Ok(snapshot(&symbol("VALE3.SA")))
    };
    let ttl = cache.default_ttl();

    cache.get_or_fetch(&vale, ttl, fetch).await.expect("cold fetch");
    cache.get_or_fetch(&vale, ttl, fetch).await.expect("warm hit");
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(cache.peek(&vale, ttl).await.is_none());

    cache.get_or_fetch(&vale, ttl, fetch).await.expect("refetch");
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_fetches_are_not_cached() {
    let cache = SnapshotCache::default();
    let abev = symbol("ABEV3.SA");
    let attempts = &AtomicUsize::new(0);
    let ttl = Duration::from_secs(60);

    let failing = || async move {
        attempts.fetch_add(1, Ordering::SeqCst);
        Err(FetchError::from_source(
            &symbol("ABEV3.SA"),
            SourceError::unavailable("503"),
        ))
    };
    let error = cache
        .get_or_fetch(&abev, ttl, failing)
        .await
        .expect_err("upstream down");
    assert!(error.retryable());
    assert!(cache.is_empty().await);

    let recovered = cache
        .get_or_fetch(&abev, ttl, || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Ok(snapshot(&symbol("ABEV3.SA")))
        })
        .await;
    assert!(recovered.is_ok());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn tickers_are_cached_independently() {
    let cache = SnapshotCache::default();
    let ttl = Duration::from_secs(60);
    let fetches = &AtomicUsize::new(0);

    for raw in ["PETR4.SA", "VALE3.SA", "PETR4.SA", "VALE3.SA"] {
        let ticker = symbol(raw);
        cache
            .get_or_fetch(&ticker, ttl, || async move {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(snapshot(&symbol(raw)))
            })
            .await
            .expect("fetch succeeds");
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len().await, 2);

    assert!(cache.invalidate(&symbol("PETR4.SA")));
    assert!(!cache.invalidate(&symbol("PETR4.SA")));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn refresh_mode_replaces_a_fresh_entry() {
    let cache = SnapshotCache::default();
    let itub = symbol("ITUB4.SA");
    let ttl = Duration::from_secs(60);
    let fetches = &AtomicUsize::new(0);
    let fetch = || async move {
        fetches.fetch_add(1, Ordering::SeqCst);
        Ok(snapshot(&symbol("ITUB4.SA")))
    };

    let first = cache
        .get_or_fetch_with_mode(&itub, ttl, CacheMode::Use, fetch)
        .await
        .expect("cold fetch");
    let refreshed = cache
        .get_or_fetch_with_mode(&itub, ttl, CacheMode::Refresh, fetch)
        .await
        .expect("forced fetch");
    let cached = cache
        .get_or_fetch_with_mode(&itub, ttl, CacheMode::Use, fetch)
        .await
        .expect("warm hit");

    assert_eq!(fetches.load(Ordering::SeqCst), 2);
    assert!(!Arc::ptr_eq(&first, &refreshed));
    assert!(Arc::ptr_eq(&refreshed, &cached));
}
