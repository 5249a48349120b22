//! CacheStore expiry, refresh, failure and race behavior

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;

use affilistore_core::domain::SearchQuery;
use affilistore_core::infrastructure::cache_store::{CacheStatus, CacheStore, ManualClock};

const TTL: Duration = Duration::from_secs(3600);

fn store<K>() -> (CacheStore<K, String>, Arc<ManualClock>)
where
    K: Eq + std::hash::Hash + Clone + std::fmt::Debug + Send + Sync,
{
    let clock = Arc::new(ManualClock::new(Utc::now()));
    (CacheStore::with_clock("test", clock.clone()), clock)
}

#[tokio::test]
async fn reads_stay_cached_until_ttl_then_fetch_exactly_once() {
    let (cache, clock) = store::<String>();
    let fetches = AtomicUsize::new(0);
    let counter = &fetches;
    let fetch = move || async move {
        let n = counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(format!("value-{n}"))
    };

    let first = cache.get_or_fetch("Fashion".into(), TTL, false, fetch).await.unwrap();
    clock.advance(Duration::from_secs(3599));
    let still_fresh = cache.get_or_fetch("Fashion".into(), TTL, false, fetch).await.unwrap();
    assert_eq!(still_fresh.value, first.value);
    assert_eq!(still_fresh.status, CacheStatus::Hit);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_secs(1));
    let expired = cache.get_or_fetch("Fashion".into(), TTL, false, fetch).await.unwrap();
    let again = cache.get_or_fetch("Fashion".into(), TTL, false, fetch).await.unwrap();
    assert_eq!(expired.status, CacheStatus::Miss);
    assert_eq!(expired.value, "value-1");
    assert_eq!(again.value, "value-1");
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn force_refresh_always_fetches() {
    let (cache, _clock) = store::<String>();
    let fetches = AtomicUsize::new(0);
    let counter = &fetches;
    let fetch = move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>("fresh".to_string())
    };

    cache.get_or_fetch("k".into(), TTL, false, fetch).await.unwrap();
    let refreshed = cache.get_or_fetch("k".into(), TTL, true, fetch).await.unwrap();
    let refreshed_again = cache.get_or_fetch("k".into(), TTL, true, fetch).await.unwrap();

    assert_eq!(refreshed.status, CacheStatus::Refresh);
    assert_eq!(refreshed_again.status, CacheStatus::Refresh);
    assert_eq!(fetches.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn failed_fetch_keeps_previous_entry() {
    let (cache, clock) = store::<String>();
    let stored = cache
        .get_or_fetch("Sports".into(), TTL, false, || async { Ok::<_, String>("good".to_string()) })
        .await
        .unwrap();

    clock.advance(TTL * 2);
    let failed = cache
        .get_or_fetch("Sports".into(), TTL, false, || async { Err::<String, _>("catalog down".to_string()) })
        .await;
    assert_eq!(failed.unwrap_err(), "catalog down");

    let metadata = cache.metadata(&"Sports".to_string()).await.unwrap();
    assert_eq!(metadata.fetched_at, stored.fetched_at);
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn failed_first_fetch_writes_nothing() {
    let (cache, _clock) = store::<String>();
    let result = cache
        .get_or_fetch("Books".into(), TTL, false, || async { Err::<String, _>("timeout") })
        .await;
    assert!(result.is_err());
    assert!(cache.is_empty().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_misses_leave_one_entry() {
    let cache = Arc::new(CacheStore::<String, String>::new("race"));

    let slow = |label: &'static str| {
        let cache = cache.clone();
        tokio::spawn(async move {
            cache
                .get_or_fetch("Electronics".into(), TTL, false, || async move {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<_, String>(label.to_string())
                })
                .await
        })
    };

    let (a, b) = tokio::join!(slow("a"), slow("b"));
    let a = a.unwrap().unwrap();
    let b = b.unwrap().unwrap();
    assert!(["a", "b"].contains(&a.value.as_str()));
    assert!(["a", "b"].contains(&b.value.as_str()));

    assert_eq!(cache.len().await, 1);
    let stored = cache
        .get_or_fetch("Electronics".into(), TTL, false, || async { Ok::<_, String>("unused".to_string()) })
        .await
        .unwrap();
    assert!(stored.is_hit());
    assert!(stored.value == "a" || stored.value == "b");
}

#[tokio::test]
async fn search_keys_differing_in_one_filter_do_not_share_entries() {
    let (cache, _clock) = store();
    let mut cheap = SearchQuery::new("shoes");
    cheap.min_price = Some(1000);
    let mut pricier = SearchQuery::new("shoes");
    pricier.min_price = Some(2000);

    cache
        .get_or_fetch(cheap.canonical(), TTL, false, || async { Ok::<_, String>("cheap".to_string()) })
        .await
        .unwrap();
    let second = cache
        .get_or_fetch(pricier.canonical(), TTL, false, || async { Ok::<_, String>("pricier".to_string()) })
        .await
        .unwrap();

    assert_ne!(cheap.canonical(), pricier.canonical());
    assert_eq!(second.status, CacheStatus::Miss);
    assert_eq!(second.value, "pricier");
    assert_eq!(cache.len().await, 2);
}

#[tokio::test]
async fn invalidate_all_empties_the_store() {
    let (cache, _clock) = store::<String>();
    for key in ["a", "b", "c"] {
        cache
            .get_or_fetch(key.into(), TTL, false, || async { Ok::<_, String>(String::new()) })
            .await
            .unwrap();
    }
    assert_eq!(cache.invalidate_all().await, 3);
    assert!(cache.is_empty().await);
}
