//! Single-document pipeline: prompt → synthesis → render → encode → persist.
//!
//! Every stage either succeeds or returns a typed error; nothing is persisted unless
//! all earlier stages succeeded. Rendering and encoding are CPU-bound and run inside
//! `tokio::task::spawn_blocking`.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::documents::DocumentStore;
use crate::encode::{generate_filename, EncodedDocument, FormatEncoder};
use crate::errors::AppError;
use crate::generation::prompts::{
    build_cover_letter_prompt, build_cv_prompt, build_pitch_deck_prompt,
};
use crate::generation::request::{CoverLetterParams, CvParams, GenerationOptions, PitchDeckParams};
use crate::generation::synthesizer::ContentSynthesizer;
use crate::models::document::{CvStyle, DocumentKind, GeneratedArtifact, OutputFormat};
use crate::models::profile::{ApplicantProfile, OpportunityRecord};
use crate::render::{RenderMetadata, TemplateRenderer};

/// Everything one pipeline run needs after the kind-specific preparation.
struct Job {
    user_id: Uuid,
    kind: DocumentKind,
    prompt: String,
    metadata: RenderMetadata,
    style: Option<CvStyle>,
    options: GenerationOptions,
    record: Value,
}

pub struct DocumentPipeline {
    synthesizer: Arc<dyn ContentSynthesizer>,
    renderer: Arc<TemplateRenderer>,
    encoder: FormatEncoder,
    store: Arc<DocumentStore>,
}

impl DocumentPipeline {
    pub fn new(
        synthesizer: Arc<dyn ContentSynthesizer>,
        renderer: TemplateRenderer,
        encoder: FormatEncoder,
        store: Arc<DocumentStore>,
    ) -> Self {
        Self {
            synthesizer,
            renderer: Arc::new(renderer),
            encoder,
            store,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub async fn generate_cover_letter(
        &self,
        profile: &ApplicantProfile,
        opportunity: &OpportunityRecord,
        params: &CoverLetterParams,
        options: GenerationOptions,
    ) -> Result<GeneratedArtifact, AppError> {
        ensure_document_format(options.format)?;
        let prompt = build_cover_letter_prompt(profile, opportunity, params, options.locale)?;
        let metadata = RenderMetadata {
            company_name: Some(params.company_name.clone()),
            position_title: Some(params.position_title.clone()),
            sector: opportunity.primary_sector().map(str::to_string),
            ..applicant_metadata(profile, options)
        };
        let record = json!({
            "opportunity_id": params.opportunity_id,
            "company_name": params.company_name,
            "position_title": params.position_title,
            "additional_info": params.additional_info,
            "locale": options.locale,
        });

        self.run(Job {
            user_id: profile.user_id,
            kind: DocumentKind::CoverLetter,
            prompt,
            metadata,
            style: None,
            options,
            record,
        })
        .await
    }

    pub async fn generate_cv(
        &self,
        profile: &ApplicantProfile,
        params: &CvParams,
        options: GenerationOptions,
    ) -> Result<GeneratedArtifact, AppError> {
        ensure_document_format(options.format)?;
        let prompt = build_cv_prompt(profile, params, options.locale)?;
        let metadata = RenderMetadata {
            sector: Some(params.sector.clone()),
            ..applicant_metadata(profile, options)
        };
        let record = json!({
            "sector": params.sector,
            "style": params.style,
            "locale": options.locale,
        });

        self.run(Job {
            user_id: profile.user_id,
            kind: DocumentKind::Cv,
            prompt,
            metadata,
            style: Some(params.style),
            options,
            record,
        })
        .await
    }

    pub async fn generate_pitch_deck(
        &self,
        profile: &ApplicantProfile,
        params: &PitchDeckParams,
        options: GenerationOptions,
    ) -> Result<GeneratedArtifact, AppError> {
        ensure_document_format(options.format)?;
        let prompt = build_pitch_deck_prompt(params, options.locale)?;
        let metadata = RenderMetadata {
            project_name: Some(params.project_name.clone()),
            project_description: Some(params.project_description.clone()),
            target_audience: Some(params.target_audience.clone()),
            key_points: params.key_points.clone(),
            ..applicant_metadata(profile, options)
        };
        let record = json!({
            "project_name": params.project_name,
            "target_audience": params.target_audience,
            "key_points": params.key_points,
            "locale": options.locale,
        });

        self.run(Job {
            user_id: profile.user_id,
            kind: DocumentKind::PitchDeck,
            prompt,
            metadata,
            style: None,
            options,
            record,
        })
        .await
    }

    async fn run(&self, job: Job) -> Result<GeneratedArtifact, AppError> {
        let Job {
            user_id,
            kind,
            prompt,
            metadata,
            style,
            options,
            record,
        } = job;
        let correlation_id = Uuid::new_v4();
        info!(
            user_id = %user_id,
            kind = %kind,
            format = %options.format,
            %correlation_id,
            "Generating document"
        );

        let text = self.synthesizer.synthesize(&prompt, correlation_id).await?;
        if text.trim().is_empty() {
            return Err(AppError::SynthesisUnavailable(format!(
                "empty content for {kind} ({correlation_id})"
            )));
        }

        let encoded = self.render_and_encode(kind, text, metadata, style, options.format).await?;
        let filename = generate_filename(kind, encoded.extension);

        let artifact = self
            .store
            .persist(user_id, kind, options.format, filename, encoded.bytes, Some(record))
            .await?;

        info!(
            user_id = %user_id,
            kind = %kind,
            artifact_id = %artifact.id,
            %correlation_id,
            "Document generated"
        );
        Ok(artifact)
    }

    async fn render_and_encode(
        &self,
        kind: DocumentKind,
        text: String,
        metadata: RenderMetadata,
        style: Option<CvStyle>,
        format: OutputFormat,
    ) -> Result<EncodedDocument, AppError> {
        let renderer = Arc::clone(&self.renderer);
        let encoder = self.encoder;
        tokio::task::spawn_blocking(move || {
            let rendered = renderer.render(kind, &text, &metadata, style)?;
            encoder.encode(&rendered, format)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))?
    }
}

/// Fails fast, before any external call, on formats a single document cannot take.
fn ensure_document_format(format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Pdf | OutputFormat::Html | OutputFormat::Docx => Ok(()),
        OutputFormat::Zip => Err(AppError::UnsupportedFormat(format.to_string())),
    }
}

fn applicant_metadata(profile: &ApplicantProfile, options: GenerationOptions) -> RenderMetadata {
    RenderMetadata {
        applicant_name: Some(profile.full_name()),
        email: profile.email.clone(),
        phone: profile.phone.clone(),
        address: profile.address.clone(),
        locale: options.locale,
        ..Default::default()
    }
}
