//! On-device snapshot persistence.
//!
//! The mirror stores one JSON snapshot per collection in a plain string
//! key-value store. A snapshot that fails to decode is treated as a cache
//! miss, never an error; the next refresh rewrites it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::CacheError;
use crate::types::Listing;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

/// String key-value persistence for serialized snapshots.
///
/// Keys are collection wire names. Implementations must be `Send + Sync`;
/// operations are synchronous and expected to be fast local I/O.
pub trait SnapshotCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

// ============================================================================
// Snapshot
// ============================================================================

/// A persisted copy of one remote collection: the listings as of the last
/// successful full fetch, plus when that fetch happened.
///
/// Local mutations patch `listings` in place without touching `fetched_at`;
/// only a full fetch resets the staleness clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Epoch milliseconds of the fetch that produced this snapshot.
    pub fetched_at: i64,
    pub listings: Vec<Listing>,
}

impl Snapshot {
    pub fn encode(&self) -> Result<String, CacheError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a cached snapshot. Corrupt data logs a warning and reads as a
    /// miss.
    pub fn decode(key: &str, raw: &str) -> Option<Snapshot> {
        match serde_json::from_str(raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(key, %err, "discarding corrupt cached snapshot");
                None
            }
        }
    }

    /// Age relative to `now_ms`, in milliseconds. Clock skew can make a
    /// snapshot appear newer than `now`; that reads as age zero.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        (now_ms - self.fetched_at).max(0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
