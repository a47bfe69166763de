//! Archive Assembler: application bundles built from single-document runs.
//!
//! Sub-documents are staged through the document store, zipped from their stored
//! bytes, and removed again once the bundle is recorded. A failed attempt leaves
//! nothing behind.

use std::collections::BTreeMap;

use serde_json::json;
use tracing::{error, info};

use crate::encode::archive::{build_zip, ArchiveEntry};
use crate::encode::generate_filename;
use crate::errors::AppError;
use crate::generation::pipeline::DocumentPipeline;
use crate::generation::request::{BundleParams, CoverLetterParams, CvParams, GenerationOptions};
use crate::models::document::{CvStyle, DocumentKind, GeneratedArtifact, OutputFormat};
use crate::models::profile::{ApplicantProfile, OpportunityRecord};

const DEFAULT_COMPANY: &str = "Entreprise";
const DEFAULT_SECTOR: &str = "Général";

/// Staged sub-documents of one bundle attempt, ordered by kind.
#[derive(Debug, Default)]
pub struct ArchiveManifest {
    entries: BTreeMap<DocumentKind, GeneratedArtifact>,
}

impl ArchiveManifest {
    pub fn insert(&mut self, artifact: GeneratedArtifact) {
        self.entries.insert(artifact.kind, artifact);
    }

    pub fn artifacts(&self) -> Vec<GeneratedArtifact> {
        self.entries.values().cloned().collect()
    }
}

impl DocumentPipeline {
    /// Generates the enabled sub-documents and packages them as one ZIP artifact.
    pub async fn assemble_bundle(
        &self,
        profile: &ApplicantProfile,
        opportunity: &OpportunityRecord,
        params: &BundleParams,
        options: GenerationOptions,
    ) -> Result<GeneratedArtifact, AppError> {
        if options.format != OutputFormat::Zip {
            return Err(AppError::UnsupportedFormat(options.format.to_string()));
        }
        if !params.include_cover_letter && !params.include_cv {
            return Err(AppError::Validation(
                "include at least one of cover letter or CV".to_string(),
            ));
        }

        let mut manifest = ArchiveManifest::default();
        match self
            .build_bundle(profile, opportunity, params, options, &mut manifest)
            .await
        {
            Ok(bundle) => {
                self.store().discard(&manifest.artifacts()).await;
                info!(
                    user_id = %profile.user_id,
                    artifact_id = %bundle.id,
                    opportunity_id = %opportunity.id,
                    "Application bundle generated"
                );
                Ok(bundle)
            }
            Err(e) => {
                error!(
                    user_id = %profile.user_id,
                    opportunity_id = %opportunity.id,
                    staged = manifest.artifacts().len(),
                    "Bundle generation failed, discarding staged documents: {e}"
                );
                self.store().discard(&manifest.artifacts()).await;
                Err(AppError::BundleGenerationFailed(e.to_string()))
            }
        }
    }

    async fn build_bundle(
        &self,
        profile: &ApplicantProfile,
        opportunity: &OpportunityRecord,
        params: &BundleParams,
        options: GenerationOptions,
        manifest: &mut ArchiveManifest,
    ) -> Result<GeneratedArtifact, AppError> {
        let sub_options = GenerationOptions::new(OutputFormat::Pdf, options.locale);

        if params.include_cover_letter {
            let letter = CoverLetterParams {
                opportunity_id: opportunity.id,
                company_name: opportunity
                    .organization
                    .as_deref()
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .unwrap_or(DEFAULT_COMPANY)
                    .to_string(),
                position_title: opportunity.title.trim().to_string(),
                additional_info: None,
            };
            let artifact = self
                .generate_cover_letter(profile, opportunity, &letter, sub_options)
                .await?;
            manifest.insert(artifact);
        }

        if params.include_cv {
            let cv = CvParams {
                sector: opportunity
                    .primary_sector()
                    .unwrap_or(DEFAULT_SECTOR)
                    .to_string(),
                style: CvStyle::Modern,
            };
            let artifact = self.generate_cv(profile, &cv, sub_options).await?;
            manifest.insert(artifact);
        }

        let mut entries = Vec::new();
        for artifact in manifest.artifacts() {
            let bytes = self.store().read_bytes(&artifact).await?;
            entries.push(ArchiveEntry {
                filename: artifact.filename.clone(),
                bytes,
            });
        }
        let zip = tokio::task::spawn_blocking(move || build_zip(&entries))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("archive task failed: {e}")))??;

        let documents: Vec<&str> = manifest
            .entries
            .values()
            .map(|a| a.filename.as_str())
            .collect();
        let record = json!({
            "opportunity_id": opportunity.id,
            "opportunity_title": opportunity.title,
            "documents": documents,
            "locale": options.locale,
        });

        self.store()
            .persist(
                profile.user_id,
                DocumentKind::ApplicationBundle,
                OutputFormat::Zip,
                generate_filename(DocumentKind::ApplicationBundle, OutputFormat::Zip.extension()),
                zip,
                Some(record),
            )
            .await
    }
}
