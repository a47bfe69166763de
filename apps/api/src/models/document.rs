use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

// ────────────────────────────────────────────────────────────────────────────
// Document kind
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    CoverLetter,
    Cv,
    PitchDeck,
    ApplicationBundle,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::CoverLetter => "cover_letter",
            DocumentKind::Cv => "cv",
            DocumentKind::PitchDeck => "pitch_deck",
            DocumentKind::ApplicationBundle => "application_bundle",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cover_letter" => Ok(DocumentKind::CoverLetter),
            "cv" => Ok(DocumentKind::Cv),
            "pitch_deck" => Ok(DocumentKind::PitchDeck),
            // "application_file" is the generate endpoint's name for bundles
            "application_bundle" | "application_file" => Ok(DocumentKind::ApplicationBundle),
            other => Err(AppError::Validation(format!("Unknown document kind '{other}'"))),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output format
// ────────────────────────────────────────────────────────────────────────────

/// Output encoding of a generated artifact.
///
/// `Docx` is accepted but degraded: the encoder emits the HTML bytes under a
/// `.docx` name. `Zip` is only produced by bundle assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Pdf,
    Html,
    Docx,
    Zip,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Html => "html",
            OutputFormat::Docx => "docx",
            OutputFormat::Zip => "zip",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            OutputFormat::Zip => "application/zip",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "html" | "structured-markup" => Ok(OutputFormat::Html),
            "docx" | "word-processor-format" => Ok(OutputFormat::Docx),
            "zip" | "archive" => Ok(OutputFormat::Zip),
            other => Err(AppError::UnsupportedFormat(other.to_string())),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Style and locale
// ────────────────────────────────────────────────────────────────────────────

/// CV layout variant. Affects markup only, never content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvStyle {
    #[default]
    Modern,
    Classic,
    Creative,
}

impl CvStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CvStyle::Modern => "modern",
            CvStyle::Classic => "classic",
            CvStyle::Creative => "creative",
        }
    }
}

/// Language used for date stamps, fixed template labels and the synthesis instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    pub fn language_name(&self) -> &'static str {
        match self {
            Locale::Fr => "French",
            Locale::En => "English",
        }
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" | "fr_fr" | "fr-fr" => Ok(Locale::Fr),
            "en" | "en_us" | "en-us" | "en_gb" | "en-gb" => Ok(Locale::En),
            other => Err(anyhow::anyhow!("Unsupported locale '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Persisted artifact
// ────────────────────────────────────────────────────────────────────────────

/// Raw `generated_documents` row.
#[derive(Debug, Clone, FromRow)]
pub struct GeneratedDocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub format: String,
    pub storage_key: String,
    pub filename: String,
    pub size_bytes: i64,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// A stored generated document and its metadata record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedArtifact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: DocumentKind,
    pub format: OutputFormat,
    /// Blob storage locator. Never exposed over the API.
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub filename: String,
    pub size_bytes: i64,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<GeneratedDocumentRow> for GeneratedArtifact {
    type Error = AppError;

    fn try_from(row: GeneratedDocumentRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse::<DocumentKind>().map_err(|_| {
            AppError::Persistence(format!("row {} has unknown kind '{}'", row.id, row.kind))
        })?;
        let format = row.format.parse::<OutputFormat>().map_err(|_| {
            AppError::Persistence(format!("row {} has unknown format '{}'", row.id, row.format))
        })?;
        Ok(GeneratedArtifact {
            id: row.id,
            user_id: row.user_id,
            kind,
            format,
            storage_key: row.storage_key,
            filename: row.filename,
            size_bytes: row.size_bytes,
            metadata: row.metadata,
            created_at: row.created_at,
        })
    }
}
