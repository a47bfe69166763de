//! Blob storage for generated document bytes.
//!
//! The document store only ever talks to `dyn BlobStorage`; the concrete backend
//! (local filesystem or S3/MinIO) is picked at startup from `STORAGE_BACKEND`.
//!
//! Keys are owner-scoped: `documents/{user_id}/{filename}`. Keys must not contain
//! `..` or start with `/`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod local;
pub mod s3;

pub use local::LocalBlobStorage;
pub use s3::S3BlobStorage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable byte storage addressable by key.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Writes `data` under `key`. Returns only once the bytes are durable.
    async fn write(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<()>;

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Deleting a key that does not exist is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Not on the request path; the backend tests cover it.
    #[allow(dead_code)]
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Backend name for logs ("local", "s3").
    fn backend_name(&self) -> &'static str;
}

/// Builds the owner-scoped key for a generated file.
pub fn document_key(user_id: Uuid, filename: &str) -> String {
    format!("documents/{user_id}/{filename}")
}

pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
