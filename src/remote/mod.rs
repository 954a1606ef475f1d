//! Remote document-store interface.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RemoteError;
use crate::types::Document;

pub mod memory;

pub use memory::MemoryRemote;

/// The hosted document store the mirror runs against.
///
/// Implementations wrap whatever SDK the backend ships; the wire format is
/// opaque here. Two contract points every implementation must honor:
///
/// * `add` assigns the document id and injects a `createdAt` field (epoch
///   milliseconds, monotone within a collection) before persisting.
/// * Ownership rules are enforced **server-side**: a mutation of a document
///   whose `userId` does not match the authenticated caller must fail with
///   `RemoteError::PermissionDenied`. The mirror performs the same check
///   client-side, but only as a UX convenience, never as a security
///   boundary.
#[async_trait]
pub trait RemoteCollections: Send + Sync {
    /// Fetch every document in a collection.
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, RemoteError>;

    /// Fetch one document by id. `None` when it does not exist.
    async fn get_by_id(&self, collection: &str, id: &str)
        -> Result<Option<Document>, RemoteError>;

    /// Store a new document and return its server-assigned id.
    async fn add(&self, collection: &str, fields: Value) -> Result<String, RemoteError>;

    /// Overwrite the full field document of an existing entry.
    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), RemoteError>;

    /// Remove a document. Deleting an absent id is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError>;

    /// Fetch the documents whose `field` equals `value`.
    async fn query_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, RemoteError>;
}
