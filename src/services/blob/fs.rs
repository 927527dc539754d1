use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::services::blob::client::{BlobError, BlobResult, BlobStore};

/// Filesystem-backed object store. Each key maps to a file below `root`.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Keys are relative, `/`-separated and may not climb out of `root`.
    fn path_for(&self, key: &str) -> BlobResult<PathBuf> {
        let invalid = || BlobError::InvalidKey(key.to_string());

        if key.is_empty() || key.contains('\\') || key.contains('\0') {
            return Err(invalid());
        }
        let rel = Path::new(key);
        if !rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(invalid());
        }
        if key.split('/').any(str::is_empty) {
            return Err(invalid());
        }

        Ok(self.root.join(rel))
    }
}

fn not_found_or_io(key: &str, e: std::io::Error) -> BlobError {
    if e.kind() == ErrorKind::NotFound {
        BlobError::NotFound(key.to_string())
    } else {
        BlobError::Io(e)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn exists(&self, key: &str) -> BlobResult<bool> {
        let path = self.path_for(key)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BlobError::Io(e)),
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> BlobResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> BlobResult<Vec<u8>> {
        let path = self.path_for(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| not_found_or_io(key, e))
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(key, e))
    }
}
