//! Wire bodies for the generation endpoints and their validation into a
//! `GenerationRequest`.

use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::{CvStyle, DocumentKind, Locale, OutputFormat};

const MAX_SHORT_TEXT: usize = 255;
const MAX_ADDITIONAL_INFO: usize = 1000;
const MAX_PROJECT_DESCRIPTION: usize = 2000;
const MAX_TARGET_AUDIENCE: usize = 500;
const MIN_KEY_POINTS: usize = 3;
const MAX_KEY_POINTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterParams {
    pub opportunity_id: Uuid,
    pub company_name: String,
    pub position_title: String,
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CvParams {
    pub sector: String,
    pub style: CvStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchDeckParams {
    pub project_name: String,
    pub project_description: String,
    pub target_audience: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleParams {
    pub opportunity_id: Uuid,
    pub include_cover_letter: bool,
    pub include_cv: bool,
}

/// A validated generation request, one variant per document kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    CoverLetter(CoverLetterParams),
    Cv(CvParams),
    PitchDeck(PitchDeckParams),
    ApplicationBundle(BundleParams),
}

impl GenerationRequest {
    pub fn kind(&self) -> DocumentKind {
        match self {
            GenerationRequest::CoverLetter(_) => DocumentKind::CoverLetter,
            GenerationRequest::Cv(_) => DocumentKind::Cv,
            GenerationRequest::PitchDeck(_) => DocumentKind::PitchDeck,
            GenerationRequest::ApplicationBundle(_) => DocumentKind::ApplicationBundle,
        }
    }
}

/// Output options shared by every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOptions {
    pub format: OutputFormat,
    pub locale: Locale,
}

impl GenerationOptions {
    pub fn new(format: OutputFormat, locale: Locale) -> Self {
        Self { format, locale }
    }
}

/// A request that is ready for the service: owner, parameters, output options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub user_id: Uuid,
    pub request: GenerationRequest,
    pub options: GenerationOptions,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire bodies
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CoverLetterBody {
    pub user_id: Option<Uuid>,
    pub opportunity_id: Option<Uuid>,
    pub company_name: Option<String>,
    pub position_title: Option<String>,
    pub additional_info: Option<String>,
    pub format: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CvBody {
    pub user_id: Option<Uuid>,
    pub sector: Option<String>,
    /// Accepted as `style` or `template`.
    #[serde(alias = "template")]
    pub style: Option<String>,
    pub format: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PitchDeckBody {
    pub user_id: Option<Uuid>,
    pub project_name: Option<String>,
    pub project_description: Option<String>,
    pub target_audience: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    pub format: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationFileBody {
    pub user_id: Option<Uuid>,
    pub opportunity_id: Option<Uuid>,
    pub include_cover_letter: Option<bool>,
    pub include_cv: Option<bool>,
    pub format: Option<String>,
    pub locale: Option<String>,
}

impl CoverLetterBody {
    pub fn validate(self, default_locale: Locale) -> Result<ValidatedRequest, AppError> {
        let user_id = required_id(self.user_id, "user_id")?;
        let params = CoverLetterParams {
            opportunity_id: required_id(self.opportunity_id, "opportunity_id")?,
            company_name: required_text(self.company_name, "company_name", MAX_SHORT_TEXT)?,
            position_title: required_text(self.position_title, "position_title", MAX_SHORT_TEXT)?,
            additional_info: optional_text(
                self.additional_info,
                "additional_info",
                MAX_ADDITIONAL_INFO,
            )?,
        };
        Ok(ValidatedRequest {
            user_id,
            request: GenerationRequest::CoverLetter(params),
            options: options(self.format, OutputFormat::Pdf, self.locale, default_locale)?,
        })
    }
}

impl CvBody {
    pub fn validate(self, default_locale: Locale) -> Result<ValidatedRequest, AppError> {
        let user_id = required_id(self.user_id, "user_id")?;
        let style = match self.style.as_deref().map(|s| s.trim().to_ascii_lowercase()) {
            None => CvStyle::default(),
            Some(s) if s.is_empty() => CvStyle::default(),
            Some(s) => match s.as_str() {
                "modern" => CvStyle::Modern,
                "classic" => CvStyle::Classic,
                "creative" => CvStyle::Creative,
                other => {
                    return Err(AppError::Validation(format!(
                        "style must be one of modern, classic, creative (got '{other}')"
                    )))
                }
            },
        };
        let params = CvParams {
            sector: required_text(self.sector, "sector", MAX_SHORT_TEXT)?,
            style,
        };
        Ok(ValidatedRequest {
            user_id,
            request: GenerationRequest::Cv(params),
            options: options(self.format, OutputFormat::Pdf, self.locale, default_locale)?,
        })
    }
}

impl PitchDeckBody {
    pub fn validate(self, default_locale: Locale) -> Result<ValidatedRequest, AppError> {
        let user_id = required_id(self.user_id, "user_id")?;

        let count = self.key_points.len();
        if !(MIN_KEY_POINTS..=MAX_KEY_POINTS).contains(&count) {
            return Err(AppError::Validation(format!(
                "key_points must contain between {MIN_KEY_POINTS} and {MAX_KEY_POINTS} items (got {count})"
            )));
        }
        let key_points = self
            .key_points
            .into_iter()
            .enumerate()
            .map(|(i, point)| {
                required_text(Some(point), &format!("key_points[{i}]"), MAX_SHORT_TEXT)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let params = PitchDeckParams {
            project_name: required_text(self.project_name, "project_name", MAX_SHORT_TEXT)?,
            project_description: required_text(
                self.project_description,
                "project_description",
                MAX_PROJECT_DESCRIPTION,
            )?,
            target_audience: required_text(
                self.target_audience,
                "target_audience",
                MAX_TARGET_AUDIENCE,
            )?,
            key_points,
        };
        Ok(ValidatedRequest {
            user_id,
            request: GenerationRequest::PitchDeck(params),
            options: options(self.format, OutputFormat::Pdf, self.locale, default_locale)?,
        })
    }
}

impl ApplicationFileBody {
    pub fn validate(self, default_locale: Locale) -> Result<ValidatedRequest, AppError> {
        let user_id = required_id(self.user_id, "user_id")?;
        let params = BundleParams {
            opportunity_id: required_id(self.opportunity_id, "opportunity_id")?,
            include_cover_letter: self.include_cover_letter.unwrap_or(true),
            include_cv: self.include_cv.unwrap_or(true),
        };
        Ok(ValidatedRequest {
            user_id,
            request: GenerationRequest::ApplicationBundle(params),
            options: options(self.format, OutputFormat::Zip, self.locale, default_locale)?,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field helpers
// ────────────────────────────────────────────────────────────────────────────

fn required_id(value: Option<Uuid>, field: &str) -> Result<Uuid, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

fn required_text(value: Option<String>, field: &str, max: usize) -> Result<String, AppError> {
    optional_text(value, field, max)?
        .ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// Trims; blank becomes `None`. Length is counted in characters.
fn optional_text(
    value: Option<String>,
    field: &str,
    max: usize,
) -> Result<Option<String>, AppError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let len = value.chars().count();
    if len > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters (got {len})"
        )));
    }
    Ok(Some(value.to_string()))
}

fn options(
    format: Option<String>,
    default_format: OutputFormat,
    locale: Option<String>,
    default_locale: Locale,
) -> Result<GenerationOptions, AppError> {
    let format = match format.as_deref().map(str::trim) {
        None | Some("") => default_format,
        Some(f) => f.parse::<OutputFormat>()?,
    };
    let locale = match locale.as_deref().map(str::trim) {
        None | Some("") => default_locale,
        Some(l) => l
            .parse::<Locale>()
            .map_err(|e| AppError::Validation(e.to_string()))?,
    };
    Ok(GenerationOptions { format, locale })
}
