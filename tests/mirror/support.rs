//! Shared fixtures for mirror tests: a call-recording remote and snapshot
//! helpers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use gigswap_data::cache::{MemoryCache, Snapshot};
use gigswap_data::error::RemoteError;
use gigswap_data::mirror::{ListingMirror, MirrorOptions};
use gigswap_data::remote::{MemoryRemote, RemoteCollections};
use gigswap_data::types::{AdCollection, Document, Listing, ListingForm};

// ============================================================================
// RecordingRemote
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct CallCounts {
    pub get_all: usize,
    pub get_by_id: usize,
    pub add: usize,
    pub update: usize,
    pub delete: usize,
    pub query_where: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.get_all + self.get_by_id + self.add + self.update + self.delete + self.query_where
    }
}

/// Counts every call, then delegates to an inner `MemoryRemote`. Failure
/// injection goes through the inner store's `fail_next`.
pub struct RecordingRemote {
    store: MemoryRemote,
    calls: Mutex<CallCounts>,
}

impl RecordingRemote {
    pub fn new() -> Self {
        Self {
            store: MemoryRemote::new(),
            calls: Mutex::new(CallCounts::default()),
        }
    }

    pub fn store(&self) -> &MemoryRemote {
        &self.store
    }

    pub fn calls(&self) -> CallCounts {
        *self.calls.lock()
    }
}

#[async_trait]
impl RemoteCollections for RecordingRemote {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, RemoteError> {
        self.calls.lock().get_all += 1;
        self.store.get_all(collection).await
    }

    async fn get_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, RemoteError> {
        self.calls.lock().get_by_id += 1;
        self.store.get_by_id(collection, id).await
    }

    async fn add(&self, collection: &str, fields: Value) -> Result<String, RemoteError> {
        self.calls.lock().add += 1;
        self.store.add(collection, fields).await
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), RemoteError> {
        self.calls.lock().update += 1;
        self.store.update(collection, id, fields).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        self.calls.lock().delete += 1;
        self.store.delete(collection, id).await
    }

    async fn query_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, RemoteError> {
        self.calls.lock().query_where += 1;
        self.store.query_where(collection, field, value).await
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub remote: Arc<RecordingRemote>,
    pub cache: Arc<MemoryCache>,
    pub mirror: ListingMirror,
}

pub fn harness(
    collection: AdCollection,
    user_id: &str,
    stale_after: Option<Duration>,
) -> Harness {
    let remote = Arc::new(RecordingRemote::new());
    let cache = Arc::new(MemoryCache::new());
    let mirror = ListingMirror::new(MirrorOptions {
        remote: remote.clone(),
        cache: cache.clone(),
        collection,
        user_id: user_id.to_string(),
        stale_after,
    });
    Harness {
        remote,
        cache,
        mirror,
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn ad_fields(concert: &str, user_id: &str, user_name: &str, price: &str) -> Value {
    json!({
        "concertName": concert,
        "ticketType": "Standing",
        "numTickets": 2,
        "priceRange": price,
        "location": "Oslo",
        "phoneNumber": "4040404040",
        "userId": user_id,
        "userName": user_name,
    })
}

pub fn listing(id: &str, concert: &str, user_id: &str, user_name: &str, price: &str) -> Listing {
    Listing {
        id: id.to_string(),
        concert_name: concert.to_string(),
        ticket_type: "Standing".to_string(),
        num_tickets: 2,
        price_range: price.to_string(),
        location: "Oslo".to_string(),
        phone_number: "4040404040".to_string(),
        event_date: None,
        image_url: None,
        user_id: user_id.to_string(),
        user_name: user_name.to_string(),
        created_at: 1,
    }
}

pub fn valid_form(concert: &str) -> ListingForm {
    ListingForm {
        concert_name: concert.to_string(),
        ticket_type: "Standing".to_string(),
        num_tickets: "2".to_string(),
        price_range: "50".to_string(),
        location: "Oslo".to_string(),
        phone_number: "4040404040".to_string(),
        event_date: None,
        image_url: None,
    }
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Seed a snapshot directly into the cache.
pub fn put_snapshot(cache: &MemoryCache, key: &str, fetched_at: i64, listings: Vec<Listing>) {
    use gigswap_data::cache::SnapshotCache;
    let snapshot = Snapshot {
        fetched_at,
        listings,
    };
    cache.set(key, &snapshot.encode().unwrap()).unwrap();
}

/// Read back the snapshot the mirror persisted.
pub fn cached_snapshot(cache: &MemoryCache, key: &str) -> Option<Snapshot> {
    use gigswap_data::cache::SnapshotCache;
    cache
        .get(key)
        .unwrap()
        .and_then(|raw| Snapshot::decode(key, &raw))
}
