//! In-memory `RemoteCollections` implementation.
//!
//! Reference backend for tests and offline development. Ids are assigned
//! server-side (`doc-N`) and `createdAt` is stamped from a logical clock so
//! insertion order is observable and deterministic.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::error::RemoteError;
use crate::types::Document;

use super::RemoteCollections;

struct MemoryRemoteInner {
    /// collection name → documents in insertion order
    collections: HashMap<String, Vec<Document>>,
    next_id: u64,
    /// Logical `createdAt` clock, shared across collections so stamps are
    /// monotone within each.
    clock: i64,
    /// One-shot failure injected into the next call, whichever it is.
    fail_next: Option<RemoteError>,
}

pub struct MemoryRemote {
    inner: Mutex<MemoryRemoteInner>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryRemoteInner {
                collections: HashMap::new(),
                next_id: 1,
                clock: 0,
                fail_next: None,
            }),
        }
    }

    /// Seed a document with a known id, bypassing id assignment. The
    /// `createdAt` stamp is still injected if the fields lack one.
    pub fn seed(&self, collection: &str, id: &str, mut fields: Value) {
        let mut inner = self.inner.lock();
        inner.clock += 1;
        if let Some(obj) = fields.as_object_mut() {
            obj.entry("createdAt").or_insert(json!(inner.clock));
        }
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.to_string(),
                fields,
            });
    }

    /// Make the next call (any operation) return `err`.
    pub fn fail_next(&self, err: RemoteError) {
        self.inner.lock().fail_next = Some(err);
    }

    /// Number of documents currently stored in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.inner
            .lock()
            .collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn take_failure(inner: &mut MemoryRemoteInner) -> Result<(), RemoteError> {
        match inner.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteCollections for MemoryRemote {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;
        Ok(inner
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| doc.id == id))
            .cloned())
    }

    async fn add(&self, collection: &str, mut fields: Value) -> Result<String, RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        let id = format!("doc-{}", inner.next_id);
        inner.next_id += 1;
        inner.clock += 1;
        if let Some(obj) = fields.as_object_mut() {
            obj.insert("createdAt".to_string(), json!(inner.clock));
        }

        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        let doc = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| doc.id == id))
            .ok_or_else(|| RemoteError::Backend {
                message: format!("no document {collection}/{id}"),
                source: None,
            })?;
        doc.fields = fields;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.retain(|doc| doc.id != id);
        }
        Ok(())
    }

    async fn query_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, RemoteError> {
        let mut inner = self.inner.lock();
        Self::take_failure(&mut inner)?;

        Ok(inner
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.fields.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
