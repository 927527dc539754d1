use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::services::blob::client::{BlobError, BlobResult, BlobStore};

/// Process-local object store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> BlobResult<()> {
        self.objects.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }
}
