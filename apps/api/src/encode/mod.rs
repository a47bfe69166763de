//! Format Encoder: turns a rendered document into downloadable bytes.

pub mod archive;
pub mod metrics;
pub mod pdf;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::warn;

use crate::errors::AppError;
use crate::models::document::{DocumentKind, OutputFormat};
use crate::render::RenderedDocument;

const FILENAME_SUFFIX_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct EncodedDocument {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FormatEncoder;

impl FormatEncoder {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(
        &self,
        rendered: &RenderedDocument,
        format: OutputFormat,
    ) -> Result<EncodedDocument, AppError> {
        let bytes = match format {
            OutputFormat::Pdf => pdf::write_pdf(rendered)
                .map_err(|e| AppError::Render(format!("PDF encoding failed: {e}")))?,
            OutputFormat::Html => rendered.markup.as_bytes().to_vec(),
            OutputFormat::Docx => {
                warn!(
                    kind = %rendered.kind,
                    "docx requested; emitting HTML markup under a .docx name"
                );
                rendered.markup.as_bytes().to_vec()
            }
            OutputFormat::Zip => {
                // zip only exists as the bundle container
                return Err(AppError::UnsupportedFormat(format.to_string()));
            }
        };

        Ok(EncodedDocument {
            bytes,
            extension: format.extension(),
        })
    }
}

/// `{kind}_{unix-seconds}_{8 random alphanumerics}.{ext}`
pub fn generate_filename(kind: DocumentKind, extension: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(FILENAME_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!(
        "{}_{}_{}.{}",
        kind,
        chrono::Utc::now().timestamp(),
        suffix,
        extension
    )
}
