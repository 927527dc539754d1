//! Object-store interface used by the file endpoints.
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Result type for blob operations.
pub type BlobResult<T> = Result<T, BlobError>;

/// Blob-layer errors.
///
/// Note:
/// - Kept apart from `AppError`; handlers decide which message a failure becomes.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("invalid blob key: {0}")]
    InvalidKey(String),
    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opaque key/value object store.
///
/// Keys are `"{extension}/{id}"` (see [`blob_key`]).
#[async_trait]
pub trait BlobStore: Send + Sync {
    // Returns the store backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn exists(&self, key: &str) -> BlobResult<bool>;

    // Overwrites an existing object.
    async fn put(&self, key: &str, data: Vec<u8>) -> BlobResult<()>;

    // `BlobError::NotFound` when absent.
    async fn get(&self, key: &str) -> BlobResult<Vec<u8>>;

    // `BlobError::NotFound` when absent.
    async fn delete(&self, key: &str) -> BlobResult<()>;
}

pub fn blob_key(extension: &str, id: &str) -> String {
    format!("{extension}/{id}")
}

/// Convenience for freshly generated ids.
pub fn blob_key_for(extension: &str, id: Uuid) -> String {
    blob_key(extension, &id.to_string())
}

/// Trim `*`, space, `'`, `.`, `,` and `"` from both ends of a file extension.
pub fn strip_file_extension(extension: &str) -> &str {
    extension.trim_matches(|c| matches!(c, '*' | ' ' | '\'' | '.' | ',' | '"'))
}
