use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::documents::HistoryFilter;
use crate::errors::AppError;
use crate::models::document::{DocumentKind, GeneratedArtifact, OutputFormat};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub user_id: Uuid,
    pub kind: Option<String>,
    pub format: Option<String>,
}

impl HistoryQuery {
    fn filter(&self) -> Result<HistoryFilter, AppError> {
        Ok(HistoryFilter {
            kind: self
                .kind
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .map(|k| k.trim().parse::<DocumentKind>())
                .transpose()?,
            format: self
                .format
                .as_deref()
                .filter(|f| !f.trim().is_empty())
                .map(str::parse::<OutputFormat>)
                .transpose()?,
        })
    }
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub documents: Vec<GeneratedArtifact>,
    pub total: usize,
}

/// GET /api/v1/documents/history
pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    let documents = state.store.history(params.user_id, params.filter()?).await?;
    Ok(Json(HistoryResponse {
        total: documents.len(),
        documents,
    }))
}

/// GET /api/v1/documents/:id/download
pub async fn handle_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Response, AppError> {
    let document = state.store.download(id, params.user_id).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        document.filename.replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    )
        .into_response())
}

/// DELETE /api/v1/documents/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if state.store.delete(id, params.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Document {id} not found")))
    }
}
