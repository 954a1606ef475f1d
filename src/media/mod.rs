//! Object storage for listing images.

use async_trait::async_trait;

use crate::error::MediaError;

pub mod memory;

pub use memory::MemoryObjectStore;

/// Prefix under which listing images are stored.
const AD_IMAGE_PREFIX: &str = "adImages";

/// Binary object storage with public download URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), MediaError>;

    /// Public URL for a previously uploaded object.
    async fn download_url(&self, path: &str) -> Result<String, MediaError>;
}

/// Upload a listing image and return the URL to record as its `image_url`.
///
/// A failed upload aborts the enclosing create/update; no listing ends up
/// with a dangling image reference.
pub async fn store_listing_image(
    store: &dyn ObjectStore,
    filename: &str,
    bytes: &[u8],
) -> Result<String, MediaError> {
    let path = format!("{AD_IMAGE_PREFIX}/{filename}");
    store.upload(&path, bytes).await?;
    store.download_url(&path).await
}
