use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ValidationIssue / ValidationError
// ---------------------------------------------------------------------------

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, r#"Invalid "{}": {}"#, self.field, self.message)
    }
}

impl std::error::Error for ValidationIssue {}

/// All validation failures for one submitted form, collected so the caller
/// can surface every problem at once instead of the first one hit.
#[derive(Debug, Clone)]
pub struct ValidationError(pub Vec<ValidationIssue>);

impl ValidationError {
    pub fn field(&self, name: &str) -> Option<&ValidationIssue> {
        self.0.iter().find(|issue| issue.field == name)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed:")?;
        for issue in &self.0 {
            write!(f, "\n  - {}: {}", issue.field, issue.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// RemoteError
// ---------------------------------------------------------------------------

/// Failure reported by the remote document store.
///
/// The variants distinguish causes for diagnostics, but callers treat them
/// uniformly: no call is retried automatically.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied by remote store: {0}")]
    PermissionDenied(String),

    #[error("Remote quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Malformed document {collection}/{id}")]
    Malformed {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Remote backend error: {message}")]
    Backend {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Snapshot encoding failed")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cache backend error: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// MediaError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Upload failed for \"{path}\": {message}")]
    Upload { path: String, message: String },

    #[error("No stored object at \"{path}\"")]
    Missing { path: String },
}

// ---------------------------------------------------------------------------
// GigswapError — top-level rollup
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GigswapError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("Listing not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Listing {collection}/{id} was posted by another user")]
    NotOwner { collection: String, id: String },

    #[error("No user profile for \"{user_id}\"")]
    UnknownUser { user_id: String },
}

/// Convenience alias — the default error type is `GigswapError`.
pub type Result<T, E = GigswapError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
