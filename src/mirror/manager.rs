//! ListingMirror — read-through caching and mutation for one ad collection.
//!
//! Reads serve the persisted snapshot first and refresh from the remote when
//! it is stale (last-fetch-wins, no merge with local edits). Mutations go to
//! the remote first, then patch the in-memory state and the persisted
//! snapshot so no partial state is user-visible. All state-changing
//! operations run under one async lock; nothing is retried automatically.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Mutex as TokioMutex;
use tracing::{debug, warn};

use crate::cache::{Snapshot, SnapshotCache};
use crate::error::{GigswapError, Result};
use crate::remote::RemoteCollections;
use crate::search;
use crate::types::{AdCollection, Document, Listing, ListingForm, ListingPatch, USERS_COLLECTION};
use crate::validate;

use super::types::{LoadOutcome, LoadSource, MirrorOptions};

// ============================================================================
// ListingMirror
// ============================================================================

struct MirrorState {
    listings: Vec<Listing>,
    /// `fetched_at` of the snapshot the state derives from. Mutations keep
    /// it; only a full fetch resets it.
    fetched_at: i64,
}

pub struct ListingMirror {
    remote: Arc<dyn RemoteCollections>,
    cache: Arc<dyn SnapshotCache>,
    collection: AdCollection,
    user_id: String,
    stale_after: Option<Duration>,
    state: Mutex<MirrorState>,
    /// Serializes load/refresh/create/update/delete against each other.
    write_lock: TokioMutex<()>,
}

impl ListingMirror {
    pub fn new(options: MirrorOptions) -> Self {
        Self {
            remote: options.remote,
            cache: options.cache,
            collection: options.collection,
            user_id: options.user_id,
            stale_after: options.stale_after,
            state: Mutex::new(MirrorState {
                listings: Vec::new(),
                fetched_at: 0,
            }),
            write_lock: TokioMutex::new(()),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Load the collection: serve the cached snapshot when it is younger
    /// than `stale_after`, otherwise fetch the remote collection and
    /// overwrite the snapshot.
    ///
    /// Never fails. When the fetch fails the stale snapshot (or an empty
    /// view) stays visible and the error is reported in
    /// `LoadOutcome::refresh_error`. A stale snapshot shown before the fetch
    /// completes can contain listings already deleted elsewhere; that window
    /// is bounded by fetch latency.
    pub async fn load(&self) -> LoadOutcome {
        let _guard = self.write_lock.lock().await;
        let key = self.collection.wire_name();

        let Some(snapshot) = self.read_snapshot() else {
            return match self.refresh_locked().await {
                Ok(listings) => LoadOutcome {
                    listings,
                    source: LoadSource::Remote,
                    refresh_error: None,
                },
                Err(err) => LoadOutcome {
                    listings: Vec::new(),
                    source: LoadSource::Cache,
                    refresh_error: Some(err),
                },
            };
        };

        self.install(snapshot.listings.clone(), snapshot.fetched_at);

        let now = Utc::now().timestamp_millis();
        let fresh_enough = self
            .stale_after
            .is_some_and(|window| snapshot.age_ms(now) < window.as_millis() as i64);
        if fresh_enough {
            debug!(collection = key, count = snapshot.listings.len(), "serving cached snapshot");
            return LoadOutcome {
                listings: snapshot.listings,
                source: LoadSource::Cache,
                refresh_error: None,
            };
        }

        match self.refresh_locked().await {
            Ok(listings) => LoadOutcome {
                listings,
                source: LoadSource::Remote,
                refresh_error: None,
            },
            Err(err) => {
                warn!(collection = key, %err, "refresh failed, keeping stale snapshot");
                LoadOutcome {
                    listings: snapshot.listings,
                    source: LoadSource::Cache,
                    refresh_error: Some(err),
                }
            }
        }
    }

    /// Fetch the remote collection unconditionally and overwrite both the
    /// in-memory state and the persisted snapshot. The pull-to-refresh path.
    pub async fn refresh(&self) -> Result<Vec<Listing>> {
        let _guard = self.write_lock.lock().await;
        self.refresh_locked().await
    }

    /// The current in-memory view.
    pub fn listings(&self) -> Vec<Listing> {
        self.state.lock().listings.clone()
    }

    /// Filtered view of the current state; see `search::filter`.
    pub fn search(&self, query: &str) -> Vec<Listing> {
        search::filter(&self.state.lock().listings, query)
    }

    /// All listings posted by `user_id`, straight from the remote store.
    /// Profile views use this; it does not touch the mirror.
    pub async fn listings_by_user(&self, user_id: &str) -> Result<Vec<Listing>> {
        let key = self.collection.wire_name();
        let docs = self
            .remote
            .query_where(key, "userId", &json!(user_id))
            .await?;
        self.decode_all(&docs)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Post a new ad.
    ///
    /// Validation runs first; an invalid form never reaches the network.
    /// The poster's display name is denormalized from the `users` collection,
    /// the remote store assigns id and `createdAt`, and the stored document
    /// is re-read and appended to the mirror so the ad is visible
    /// immediately after posting.
    pub async fn create(&self, form: ListingForm) -> Result<Listing> {
        let draft = validate::validate_form(&form, Utc::now().date_naive())?;

        let _guard = self.write_lock.lock().await;
        let key = self.collection.wire_name();

        let user_name = self.poster_name().await?;
        let id = self
            .remote
            .add(key, draft.to_fields(&self.user_id, &user_name))
            .await?;
        let stored = self
            .remote
            .get_by_id(key, &id)
            .await?
            .ok_or_else(|| GigswapError::NotFound {
                collection: key.to_string(),
                id: id.clone(),
            })?;
        let listing = Listing::from_document(key, &stored)?;
        debug!(collection = key, id = %listing.id, "posted new listing");

        let listings = {
            let mut state = self.state.lock();
            state.listings.push(listing.clone());
            state.listings.clone()
        };
        self.persist(&listings);
        Ok(listing)
    }

    /// Edit an existing ad. Only the poster may edit; the guard fires before
    /// any network call (real backends re-enforce it server-side). The merged
    /// document is re-validated, written remotely as a full overwrite, then
    /// patched into the mirror in place.
    pub async fn update(&self, id: &str, patch: ListingPatch) -> Result<Listing> {
        let _guard = self.write_lock.lock().await;
        let key = self.collection.wire_name();

        let current = self.find(id)?;
        self.ensure_owner(&current)?;

        let merged = patch.apply(&current);
        validate::validate_listing(&merged)?;

        self.remote.update(key, id, merged.to_fields()).await?;
        debug!(collection = key, id, "updated listing");

        let listings = {
            let mut state = self.state.lock();
            if let Some(entry) = state.listings.iter_mut().find(|l| l.id == id) {
                *entry = merged.clone();
            }
            state.listings.clone()
        };
        self.persist(&listings);
        Ok(merged)
    }

    /// Delete an ad. Only the poster may delete; the guard fires before any
    /// network call. On success the listing is gone from the in-memory state
    /// and the persisted snapshot in one step, so no partial-delete state is
    /// ever user-visible.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let key = self.collection.wire_name();

        let current = self.find(id)?;
        self.ensure_owner(&current)?;

        self.remote.delete(key, id).await?;
        debug!(collection = key, id, "deleted listing");

        let listings = {
            let mut state = self.state.lock();
            state.listings.retain(|l| l.id != id);
            state.listings.clone()
        };
        self.persist(&listings);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn refresh_locked(&self) -> Result<Vec<Listing>> {
        let key = self.collection.wire_name();
        let docs = self.remote.get_all(key).await?;
        let listings = self.decode_all(&docs)?;
        debug!(collection = key, count = listings.len(), "refreshed from remote");

        self.install(listings.clone(), Utc::now().timestamp_millis());
        self.persist(&listings);
        Ok(listings)
    }

    fn decode_all(&self, docs: &[Document]) -> Result<Vec<Listing>> {
        let key = self.collection.wire_name();
        docs.iter()
            .map(|doc| Listing::from_document(key, doc).map_err(GigswapError::from))
            .collect()
    }

    fn install(&self, listings: Vec<Listing>, fetched_at: i64) {
        let mut state = self.state.lock();
        state.listings = listings;
        state.fetched_at = fetched_at;
    }

    fn read_snapshot(&self) -> Option<Snapshot> {
        let key = self.collection.wire_name();
        match self.cache.get(key) {
            Ok(Some(raw)) => Snapshot::decode(key, &raw),
            Ok(None) => None,
            Err(err) => {
                warn!(collection = key, %err, "snapshot cache read failed");
                None
            }
        }
    }

    /// Write the current listings back to the snapshot cache, keeping the
    /// state's `fetched_at`. The remote is already updated when this runs,
    /// so a cache failure must not fail the operation; instead the snapshot
    /// is dropped entirely so the next `load` falls back to a full fetch
    /// rather than showing outdated entries.
    fn persist(&self, listings: &[Listing]) {
        let key = self.collection.wire_name();
        let snapshot = Snapshot {
            fetched_at: self.state.lock().fetched_at,
            listings: listings.to_vec(),
        };
        let written = snapshot
            .encode()
            .and_then(|raw| self.cache.set(key, &raw));
        if let Err(err) = written {
            warn!(collection = key, %err, "snapshot persist failed, invalidating cache entry");
            if let Err(err) = self.cache.remove(key) {
                warn!(collection = key, %err, "snapshot invalidation failed");
            }
        }
    }

    fn find(&self, id: &str) -> Result<Listing> {
        self.state
            .lock()
            .listings
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| GigswapError::NotFound {
                collection: self.collection.wire_name().to_string(),
                id: id.to_string(),
            })
    }

    fn ensure_owner(&self, listing: &Listing) -> Result<()> {
        if listing.user_id == self.user_id {
            Ok(())
        } else {
            Err(GigswapError::NotOwner {
                collection: self.collection.wire_name().to_string(),
                id: listing.id.clone(),
            })
        }
    }

    async fn poster_name(&self) -> Result<String> {
        let doc = self
            .remote
            .get_by_id(USERS_COLLECTION, &self.user_id)
            .await?
            .ok_or_else(|| GigswapError::UnknownUser {
                user_id: self.user_id.clone(),
            })?;
        Ok(doc
            .fields
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }
}
