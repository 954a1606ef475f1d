//! Load and refresh behavior: read-through caching, staleness, overwrite
//! semantics, and failure handling.

use std::time::Duration;

use serde_json::json;

use gigswap_data::cache::SnapshotCache;
use gigswap_data::error::{GigswapError, RemoteError};
use gigswap_data::mirror::LoadSource;
use gigswap_data::types::AdCollection;

use super::support::*;

const HOUR: Duration = Duration::from_secs(3600);

#[tokio::test]
async fn cold_load_fetches_and_persists_snapshot() {
    let h = harness(AdCollection::Buyer, "user-a", Some(HOUR));
    h.remote
        .store()
        .seed("buyerAds", "doc-1", ad_fields("Rock Fest", "user-a", "Alice", "50"));

    let outcome = h.mirror.load().await;

    assert_eq!(outcome.source, LoadSource::Remote);
    assert!(outcome.is_fresh());
    assert_eq!(outcome.listings.len(), 1);
    assert_eq!(outcome.listings[0].concert_name, "Rock Fest");

    let snapshot = cached_snapshot(&h.cache, "buyerAds").unwrap();
    assert_eq!(snapshot.listings, outcome.listings);
    assert!(snapshot.fetched_at > 0);
}

#[tokio::test]
async fn fresh_snapshot_is_served_without_a_network_call() {
    let h = harness(AdCollection::Buyer, "user-a", Some(HOUR));
    put_snapshot(
        &h.cache,
        "buyerAds",
        now_ms(),
        vec![listing("doc-1", "Rock Fest", "user-a", "Alice", "50")],
    );

    let outcome = h.mirror.load().await;

    assert_eq!(outcome.source, LoadSource::Cache);
    assert!(outcome.refresh_error.is_none());
    assert_eq!(outcome.listings[0].id, "doc-1");
    assert_eq!(h.remote.calls().get_all, 0, "fresh snapshot still hit the network");
    assert_eq!(h.mirror.listings().len(), 1, "state not installed from snapshot");
}

#[tokio::test]
async fn stale_snapshot_is_replaced_by_the_fetch() {
    let h = harness(AdCollection::Buyer, "user-a", Some(HOUR));
    // Snapshot holds a listing that was deleted remotely since.
    put_snapshot(
        &h.cache,
        "buyerAds",
        now_ms() - 2 * HOUR.as_millis() as i64,
        vec![listing("doc-old", "Cancelled Gig", "user-b", "Bob", "10")],
    );
    h.remote
        .store()
        .seed("buyerAds", "doc-new", ad_fields("Rock Fest", "user-a", "Alice", "50"));

    let outcome = h.mirror.load().await;

    assert_eq!(outcome.source, LoadSource::Remote);
    let ids: Vec<&str> = outcome.listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["doc-new"], "last-fetch-wins overwrite did not happen");

    let snapshot = cached_snapshot(&h.cache, "buyerAds").unwrap();
    assert_eq!(snapshot.listings.len(), 1);
    assert_eq!(snapshot.listings[0].id, "doc-new");
}

#[tokio::test]
async fn without_a_staleness_window_every_load_refreshes() {
    let h = harness(AdCollection::Buyer, "user-a", None);
    put_snapshot(
        &h.cache,
        "buyerAds",
        now_ms(),
        vec![listing("doc-1", "Rock Fest", "user-a", "Alice", "50")],
    );

    let outcome = h.mirror.load().await;

    assert_eq!(h.remote.calls().get_all, 1);
    assert_eq!(outcome.source, LoadSource::Remote);
    assert!(outcome.listings.is_empty(), "remote is empty, overwrite expected");
}

#[tokio::test]
async fn refresh_failure_keeps_the_stale_snapshot_visible() {
    let h = harness(AdCollection::Buyer, "user-a", None);
    put_snapshot(
        &h.cache,
        "buyerAds",
        now_ms() - 1000,
        vec![listing("doc-1", "Rock Fest", "user-a", "Alice", "50")],
    );
    h.remote
        .store()
        .fail_next(RemoteError::Unavailable("offline".to_string()));

    let outcome = h.mirror.load().await;

    assert_eq!(outcome.source, LoadSource::Cache);
    assert!(!outcome.is_fresh());
    assert!(matches!(
        outcome.refresh_error,
        Some(GigswapError::Remote(RemoteError::Unavailable(_)))
    ));
    assert_eq!(outcome.listings[0].id, "doc-1");
    assert_eq!(h.mirror.listings().len(), 1, "stale state discarded on failure");
}

#[tokio::test]
async fn refresh_failure_with_empty_cache_reports_error_and_empty_view() {
    let h = harness(AdCollection::Seller, "user-a", None);
    h.remote
        .store()
        .fail_next(RemoteError::Unavailable("offline".to_string()));

    let outcome = h.mirror.load().await;

    assert!(outcome.listings.is_empty());
    assert!(outcome.refresh_error.is_some());
    assert_eq!(outcome.source, LoadSource::Cache);
}

#[tokio::test]
async fn corrupt_snapshot_reads_as_a_miss() {
    let h = harness(AdCollection::Buyer, "user-a", Some(HOUR));
    h.cache.set("buyerAds", "{definitely not json").unwrap();
    h.remote
        .store()
        .seed("buyerAds", "doc-1", ad_fields("Rock Fest", "user-a", "Alice", "50"));

    let outcome = h.mirror.load().await;

    assert_eq!(outcome.source, LoadSource::Remote);
    assert_eq!(h.remote.calls().get_all, 1);
    assert_eq!(outcome.listings[0].id, "doc-1");
    // The rewrite also repairs the cache.
    assert!(cached_snapshot(&h.cache, "buyerAds").is_some());
}

#[tokio::test]
async fn malformed_remote_document_fails_refresh() {
    let h = harness(AdCollection::Buyer, "user-a", None);
    h.remote.store().seed("buyerAds", "doc-1", json!("not an object"));

    let err = h.mirror.refresh().await.unwrap_err();
    assert!(matches!(
        err,
        GigswapError::Remote(RemoteError::Malformed { .. })
    ));
}

#[tokio::test]
async fn seller_and_buyer_mirrors_use_separate_cache_keys() {
    let buyer = harness(AdCollection::Buyer, "user-a", None);
    buyer
        .remote
        .store()
        .seed("buyerAds", "doc-1", ad_fields("Rock Fest", "user-a", "Alice", "50"));
    buyer.mirror.load().await;

    assert!(cached_snapshot(&buyer.cache, "buyerAds").is_some());
    assert!(cached_snapshot(&buyer.cache, "sellerAds").is_none());
}
