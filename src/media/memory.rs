//! In-memory `ObjectStore`.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::MediaError;

use super::ObjectStore;

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().contains_key(path)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<(), MediaError> {
        self.objects
            .lock()
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, MediaError> {
        if self.contains(path) {
            Ok(format!("memory://{path}"))
        } else {
            Err(MediaError::Missing {
                path: path.to_string(),
            })
        }
    }
}
