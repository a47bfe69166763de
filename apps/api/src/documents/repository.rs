use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{
    DocumentKind, GeneratedArtifact, GeneratedDocumentRow, OutputFormat,
};

/// Fields of a `generated_documents` row supplied by the caller.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: DocumentKind,
    pub format: OutputFormat,
    pub storage_key: String,
    pub filename: String,
    pub size_bytes: i64,
    pub metadata: Option<Value>,
}

/// Optional history filters. `None` matches everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    pub kind: Option<DocumentKind>,
    pub format: Option<OutputFormat>,
}

/// Metadata records of generated documents. Every lookup is owner-scoped.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    async fn insert(&self, artifact: NewArtifact) -> Result<GeneratedArtifact, AppError>;

    /// Newest first.
    async fn list_by_owner(
        &self,
        user_id: Uuid,
        filter: HistoryFilter,
    ) -> Result<Vec<GeneratedArtifact>, AppError>;

    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Option<GeneratedArtifact>, AppError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

pub struct PgArtifactRepository {
    pool: PgPool,
}

impl PgArtifactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArtifactRepository for PgArtifactRepository {
    async fn insert(&self, artifact: NewArtifact) -> Result<GeneratedArtifact, AppError> {
        let row = sqlx::query_as::<_, GeneratedDocumentRow>(
            r#"
            INSERT INTO generated_documents
                (id, user_id, kind, format, storage_key, filename, size_bytes, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(artifact.id)
        .bind(artifact.user_id)
        .bind(artifact.kind.as_str())
        .bind(artifact.format.as_str())
        .bind(&artifact.storage_key)
        .bind(&artifact.filename)
        .bind(artifact.size_bytes)
        .bind(&artifact.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Persistence(format!("insert generated document: {e}")))?;

        row.try_into()
    }

    async fn list_by_owner(
        &self,
        user_id: Uuid,
        filter: HistoryFilter,
    ) -> Result<Vec<GeneratedArtifact>, AppError> {
        let rows = sqlx::query_as::<_, GeneratedDocumentRow>(
            r#"
            SELECT * FROM generated_documents
            WHERE user_id = $1
              AND ($2::text IS NULL OR kind = $2)
              AND ($3::text IS NULL OR format = $3)
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .bind(filter.kind.map(|k| k.as_str()))
        .bind(filter.format.map(|f| f.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(GeneratedArtifact::try_from).collect()
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Option<GeneratedArtifact>, AppError> {
        let row = sqlx::query_as::<_, GeneratedDocumentRow>(
            "SELECT * FROM generated_documents WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(GeneratedArtifact::try_from).transpose()
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM generated_documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
