//! Mirror configuration and load results.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::SnapshotCache;
use crate::error::GigswapError;
use crate::remote::RemoteCollections;
use crate::types::{AdCollection, Listing};

/// Configuration for `ListingMirror`. Collaborators are passed in explicitly;
/// the mirror holds no globals.
pub struct MirrorOptions {
    pub remote: Arc<dyn RemoteCollections>,
    pub cache: Arc<dyn SnapshotCache>,
    pub collection: AdCollection,
    /// The authenticated caller. Listings it creates carry this id, and only
    /// those may be edited or deleted through this mirror.
    pub user_id: String,
    /// How long a cached snapshot satisfies `load` without a network fetch.
    /// `None` means every `load` refreshes from the remote.
    pub stale_after: Option<Duration>,
}

/// Where the listings in a `LoadOutcome` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The persisted snapshot (or nothing, when the cache was empty and the
    /// refresh failed).
    Cache,
    /// A successful remote fetch.
    Remote,
}

/// Result of `ListingMirror::load`. Never an `Err`: a failed refresh leaves
/// the stale snapshot visible and is reported in `refresh_error`.
#[derive(Debug)]
pub struct LoadOutcome {
    pub listings: Vec<Listing>,
    pub source: LoadSource,
    pub refresh_error: Option<GigswapError>,
}

impl LoadOutcome {
    /// True when the listings reflect the remote collection as of this call.
    pub fn is_fresh(&self) -> bool {
        self.source == LoadSource::Remote && self.refresh_error.is_none()
    }
}
