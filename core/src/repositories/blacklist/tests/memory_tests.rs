//! Tests for the in-memory blacklist store

use chrono::Duration;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use crate::repositories::blacklist::{BlacklistStore, InMemoryBlacklistStore};
use crate::services::token::{ClockSource, ManualClock};

fn store() -> (InMemoryBlacklistStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let store = InMemoryBlacklistStore::with_clock(clock.clone() as Arc<dyn ClockSource>);
    (store, clock)
}

#[tokio::test]
async fn test_put_then_exists_until_ttl() {
    let (store, clock) = store();

    store.put("jti-1", StdDuration::from_secs(10)).await.unwrap();
    assert!(store.exists("jti-1").await.unwrap());
    assert!(!store.exists("jti-2").await.unwrap());

    clock.advance(Duration::seconds(10));
    assert!(!store.exists("jti-1").await.unwrap());
}

#[tokio::test]
async fn test_repeated_put_refreshes_ttl() {
    let (store, clock) = store();

    store.put("jti-1", StdDuration::from_secs(10)).await.unwrap();
    clock.advance(Duration::seconds(5));
    store.put("jti-1", StdDuration::from_secs(10)).await.unwrap();
    clock.advance(Duration::seconds(8));

    assert!(store.exists("jti-1").await.unwrap());
}

#[tokio::test]
async fn test_delete_reports_presence() {
    let (store, _clock) = store();

    store.put("jti-1", StdDuration::from_secs(10)).await.unwrap();
    assert!(store.delete("jti-1").await.unwrap());
    assert!(!store.delete("jti-1").await.unwrap());
    assert!(!store.exists("jti-1").await.unwrap());
}

#[tokio::test]
async fn test_linkage_index_tracks_live_entries() {
    let (store, clock) = store();

    store
        .put_with_linkage("jti-1", "sid-1", StdDuration::from_secs(5))
        .await
        .unwrap();
    store
        .put_with_linkage("jti-2", "sid-1", StdDuration::from_secs(50))
        .await
        .unwrap();
    store
        .put_with_linkage("jti-3", "sid-2", StdDuration::from_secs(50))
        .await
        .unwrap();

    let revoked = store.exists_by_linkage("sid-1").await.unwrap();
    assert_eq!(revoked.len(), 2);

    clock.advance(Duration::seconds(5));
    let revoked = store.exists_by_linkage("sid-1").await.unwrap();
    assert_eq!(revoked.len(), 1);
    assert!(revoked.contains("jti-2"));

    assert!(store.exists_by_linkage("sid-unknown").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_session_revocation_covers_any_jti() {
    let (store, clock) = store();

    store
        .revoke_linkage("sid-1", StdDuration::from_secs(30))
        .await
        .unwrap();

    assert!(store.is_linkage_revoked("sid-1").await.unwrap());
    assert!(store.is_revoked("never-seen", "sid-1").await.unwrap());
    assert!(!store.is_revoked("never-seen", "sid-2").await.unwrap());

    clock.advance(Duration::seconds(30));
    assert!(!store.is_linkage_revoked("sid-1").await.unwrap());
}

#[tokio::test]
async fn test_session_revocation_keeps_longest_ttl() {
    let (store, clock) = store();

    store
        .revoke_linkage("sid-1", StdDuration::from_secs(60))
        .await
        .unwrap();
    store
        .revoke_linkage("sid-1", StdDuration::from_secs(10))
        .await
        .unwrap();

    clock.advance(Duration::seconds(30));
    assert!(store.is_linkage_revoked("sid-1").await.unwrap());
}

#[tokio::test]
async fn test_put_if_absent_only_inserts_once() {
    let (store, clock) = store();

    assert!(store
        .put_if_absent("jti-1", "sid-1", StdDuration::from_secs(10))
        .await
        .unwrap());
    assert!(!store
        .put_if_absent("jti-1", "sid-1", StdDuration::from_secs(10))
        .await
        .unwrap());

    clock.advance(Duration::seconds(10));
    assert!(store
        .put_if_absent("jti-1", "sid-1", StdDuration::from_secs(10))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_purge_drops_expired_entries() {
    let (store, clock) = store();

    store.put("jti-1", StdDuration::from_secs(1)).await.unwrap();
    store.put("jti-2", StdDuration::from_secs(100)).await.unwrap();
    assert_eq!(store.len().await, 2);

    clock.advance(Duration::seconds(2));
    store.purge_expired().await;

    assert_eq!(store.len().await, 1);
    assert!(!store.is_empty().await);
}

#[tokio::test]
async fn test_writes_sweep_expired_entries() {
    let (store, clock) = store();

    for i in 0..1_000 {
        store
            .put_with_linkage(&format!("jti-{}", i), "sid-1", StdDuration::from_secs(1))
            .await
            .unwrap();
    }
    assert_eq!(store.footprint().await, (1_000, 1_000));

    clock.advance(Duration::hours(1));
    store.put("jti-fresh", StdDuration::from_secs(30)).await.unwrap();

    assert_eq!(store.footprint().await, (1, 0));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_sweep_keeps_live_entries() {
    let (store, clock) = store();

    store
        .put_with_linkage("short", "sid-1", StdDuration::from_secs(1))
        .await
        .unwrap();
    store
        .put_with_linkage("long", "sid-1", StdDuration::from_secs(3600))
        .await
        .unwrap();

    clock.advance(Duration::minutes(2));
    store.revoke_linkage("sid-2", StdDuration::from_secs(10)).await.unwrap();

    assert_eq!(store.footprint().await, (1, 1));
    assert!(store.exists("long").await.unwrap());
    assert_eq!(
        store.exists_by_linkage("sid-1").await.unwrap(),
        ["long".to_string()].into_iter().collect()
    );
}

#[tokio::test]
async fn test_shared_through_arc() {
    let (store, _clock) = store();
    let shared = Arc::new(store);

    shared.put("jti-1", StdDuration::from_secs(10)).await.unwrap();
    assert!(shared.exists("jti-1").await.unwrap());
    assert!(shared.ping().await.is_ok());
}
