//! Axum route handlers for the generation endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::generation::request::{
    ApplicationFileBody, CoverLetterBody, CvBody, PitchDeckBody, ValidatedRequest,
};
use crate::models::document::GeneratedArtifact;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub document: GeneratedArtifact,
    pub download_url: String,
}

impl From<GeneratedArtifact> for GenerationResponse {
    fn from(document: GeneratedArtifact) -> Self {
        let download_url = format!(
            "/api/v1/documents/{}/download?user_id={}",
            document.id, document.user_id
        );
        Self {
            document,
            download_url,
        }
    }
}

type Created = (StatusCode, Json<GenerationResponse>);

async fn run(state: &AppState, validated: ValidatedRequest) -> Result<Created, AppError> {
    let artifact = state.generation.generate(validated).await?;
    Ok((StatusCode::CREATED, Json(artifact.into())))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/generate/cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(body): Json<CoverLetterBody>,
) -> Result<Created, AppError> {
    let validated = body.validate(state.config.default_locale)?;
    run(&state, validated).await
}

/// POST /api/v1/documents/generate/cv
pub async fn handle_generate_cv(
    State(state): State<AppState>,
    Json(body): Json<CvBody>,
) -> Result<Created, AppError> {
    let validated = body.validate(state.config.default_locale)?;
    run(&state, validated).await
}

/// POST /api/v1/documents/generate/pitch-deck
pub async fn handle_generate_pitch_deck(
    State(state): State<AppState>,
    Json(body): Json<PitchDeckBody>,
) -> Result<Created, AppError> {
    let validated = body.validate(state.config.default_locale)?;
    run(&state, validated).await
}

/// POST /api/v1/documents/generate/application-file
pub async fn handle_generate_application_file(
    State(state): State<AppState>,
    Json(body): Json<ApplicationFileBody>,
) -> Result<Created, AppError> {
    let validated = body.validate(state.config.default_locale)?;
    run(&state, validated).await
}
