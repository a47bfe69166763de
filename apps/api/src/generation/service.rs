use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::pipeline::DocumentPipeline;
use crate::generation::request::{GenerationRequest, ValidatedRequest};
use crate::models::document::GeneratedArtifact;
use crate::models::profile::OpportunityRecord;
use crate::providers::{OpportunityProvider, ProfileProvider};

/// Resolves upstream entities for a validated request and dispatches it to the pipeline.
pub struct GenerationService {
    profiles: Arc<dyn ProfileProvider>,
    opportunities: Arc<dyn OpportunityProvider>,
    pipeline: DocumentPipeline,
}

impl GenerationService {
    pub fn new(
        profiles: Arc<dyn ProfileProvider>,
        opportunities: Arc<dyn OpportunityProvider>,
        pipeline: DocumentPipeline,
    ) -> Self {
        Self {
            profiles,
            opportunities,
            pipeline,
        }
    }

    pub async fn generate(&self, validated: ValidatedRequest) -> Result<GeneratedArtifact, AppError> {
        let ValidatedRequest {
            user_id,
            request,
            options,
        } = validated;
        info!(user_id = %user_id, kind = %request.kind(), "Generation requested");

        let profile = self.profiles.profile(user_id).await?;
        match request {
            GenerationRequest::CoverLetter(params) => {
                let opportunity = self.opportunity(params.opportunity_id).await?;
                self.pipeline
                    .generate_cover_letter(&profile, &opportunity, &params, options)
                    .await
            }
            GenerationRequest::Cv(params) => {
                self.pipeline.generate_cv(&profile, &params, options).await
            }
            GenerationRequest::PitchDeck(params) => {
                self.pipeline
                    .generate_pitch_deck(&profile, &params, options)
                    .await
            }
            GenerationRequest::ApplicationBundle(params) => {
                let opportunity = self.opportunity(params.opportunity_id).await?;
                self.pipeline
                    .assemble_bundle(&profile, &opportunity, &params, options)
                    .await
            }
        }
    }

    /// The opportunity id comes from the request body, so a miss is a bad
    /// request rather than a missing resource.
    async fn opportunity(&self, id: Uuid) -> Result<OpportunityRecord, AppError> {
        match self.opportunities.opportunity(id).await {
            Err(AppError::NotFound(_)) => Err(AppError::Validation(format!(
                "opportunity_id {id} does not exist"
            ))),
            other => other,
        }
    }
}
