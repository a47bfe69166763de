//! Document Store: generated bytes in blob storage plus one metadata row each.
//!
//! Bytes are always written before the row that points at them, so a visible row
//! never references missing bytes unless something outside this service removed them.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::repository::{ArtifactRepository, HistoryFilter, NewArtifact};
use crate::errors::AppError;
use crate::models::document::{DocumentKind, GeneratedArtifact, OutputFormat};
use crate::storage::{document_key, BlobStorage, StorageError};

/// Bytes of a stored document ready to be served.
#[derive(Debug, Clone)]
pub struct DownloadedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

#[derive(Clone)]
pub struct DocumentStore {
    repository: Arc<dyn ArtifactRepository>,
    blobs: Arc<dyn BlobStorage>,
}

impl DocumentStore {
    pub fn new(repository: Arc<dyn ArtifactRepository>, blobs: Arc<dyn BlobStorage>) -> Self {
        Self { repository, blobs }
    }

    /// Records an artifact whose bytes are already durable under `storage_key`.
    #[allow(clippy::too_many_arguments)]
    pub async fn save(
        &self,
        user_id: Uuid,
        kind: DocumentKind,
        format: OutputFormat,
        storage_key: String,
        filename: String,
        size_bytes: i64,
        metadata: Option<Value>,
    ) -> Result<GeneratedArtifact, AppError> {
        self.repository
            .insert(NewArtifact {
                id: Uuid::new_v4(),
                user_id,
                kind,
                format,
                storage_key,
                filename,
                size_bytes,
                metadata,
            })
            .await
    }

    /// Writes the bytes, then records them. A failed insert removes the bytes again.
    pub async fn persist(
        &self,
        user_id: Uuid,
        kind: DocumentKind,
        format: OutputFormat,
        filename: String,
        bytes: Vec<u8>,
        metadata: Option<Value>,
    ) -> Result<GeneratedArtifact, AppError> {
        let key = document_key(user_id, &filename);
        let size = bytes.len() as i64;

        self.blobs
            .write(&key, bytes, format.content_type())
            .await
            .map_err(|e| AppError::Persistence(format!("write {key}: {e}")))?;

        match self
            .save(user_id, kind, format, key.clone(), filename, size, metadata)
            .await
        {
            Ok(artifact) => {
                info!(
                    user_id = %user_id,
                    kind = %kind,
                    format = %format,
                    artifact_id = %artifact.id,
                    size_bytes = size,
                    "Persisted generated document"
                );
                Ok(artifact)
            }
            Err(e) => {
                self.remove_bytes(&key).await;
                Err(match e {
                    AppError::Persistence(msg) => AppError::Persistence(msg),
                    other => AppError::Persistence(other.to_string()),
                })
            }
        }
    }

    pub async fn history(
        &self,
        user_id: Uuid,
        filter: HistoryFilter,
    ) -> Result<Vec<GeneratedArtifact>, AppError> {
        self.repository.list_by_owner(user_id, filter).await
    }

    /// Owner-scoped lookup. Foreign and absent ids are both `NotFound`.
    pub async fn fetch(&self, id: Uuid, user_id: Uuid) -> Result<GeneratedArtifact, AppError> {
        self.repository
            .find(id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))
    }

    pub async fn download(&self, id: Uuid, user_id: Uuid) -> Result<DownloadedDocument, AppError> {
        let artifact = self.fetch(id, user_id).await?;
        let bytes = self.read_bytes(&artifact).await?;
        Ok(DownloadedDocument {
            bytes,
            filename: artifact.filename,
            content_type: artifact.format.content_type(),
        })
    }

    /// Stored bytes of an artifact the caller already holds.
    pub async fn read_bytes(&self, artifact: &GeneratedArtifact) -> Result<Vec<u8>, AppError> {
        self.blobs
            .read(&artifact.storage_key)
            .await
            .map_err(|e| match e {
                StorageError::NotFound(_) => {
                    AppError::NotFound(format!("File for document {} not found", artifact.id))
                }
                other => AppError::Persistence(other.to_string()),
            })
    }

    /// Removes the row, then the bytes on a best-effort basis.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let Some(artifact) = self.repository.find(id, user_id).await? else {
            return Ok(false);
        };
        if !self.repository.delete(id, user_id).await? {
            return Ok(false);
        }
        self.remove_bytes(&artifact.storage_key).await;
        info!(user_id = %user_id, artifact_id = %id, "Deleted generated document");
        Ok(true)
    }

    /// Removes artifacts staged during a failed or completed multi-step operation.
    /// Never fails; problems are logged.
    pub async fn discard(&self, artifacts: &[GeneratedArtifact]) {
        for artifact in artifacts {
            match self.repository.delete(artifact.id, artifact.user_id).await {
                Ok(_) => self.remove_bytes(&artifact.storage_key).await,
                Err(e) => warn!(
                    artifact_id = %artifact.id,
                    "Failed to remove staged document record: {e}"
                ),
            }
        }
    }

    async fn remove_bytes(&self, key: &str) {
        if let Err(e) = self.blobs.delete(key).await {
            warn!(
                backend = self.blobs.backend_name(),
                key,
                "Best-effort blob removal failed: {e}"
            );
        }
    }
}
