//! Template Renderer: merges synthesized text with structured metadata.
//!
//! Produces two views of the same content: HTML markup (minijinja, auto-escaped)
//! and a page/block model the PDF encoder typesets. Neither view ever contains
//! raw model output as markup.

pub mod blocks;
pub mod dates;

use chrono::NaiveDate;
use minijinja::{context, Environment};
use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;
use crate::models::document::{CvStyle, DocumentKind, Locale};
use crate::render::blocks::{parse_blocks, parse_slides, Block, Page, PageRole, Slide};

/// Structured metadata merged into a template alongside the synthesized text.
///
/// Which fields are required depends on the document kind; see `require`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderMetadata {
    pub applicant_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_name: Option<String>,
    pub position_title: Option<String>,
    pub sector: Option<String>,
    pub project_name: Option<String>,
    pub project_description: Option<String>,
    pub target_audience: Option<String>,
    /// Deck talking points; become slide titles when the synthesized deck has none.
    pub key_points: Vec<String>,
    pub locale: Locale,
}

/// Output of a single render pass. Lives only for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub kind: DocumentKind,
    pub markup: String,
    pub pages: Vec<Page>,
    pub metadata: RenderMetadata,
    pub style: Option<CvStyle>,
    pub rendered_on: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
struct Labels {
    cover_letter_title: &'static str,
    recipient_department: &'static str,
    subject_prefix: &'static str,
    subject: &'static str,
    closing: &'static str,
    target_sector: &'static str,
    presented_by: &'static str,
    contact: &'static str,
    thanks: &'static str,
    questions: &'static str,
}

impl Labels {
    fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::Fr => Labels {
                cover_letter_title: "Lettre de motivation",
                recipient_department: "Service des Ressources Humaines",
                subject_prefix: "Objet :",
                subject: "Candidature pour le poste de",
                closing: "Cordialement,",
                target_sector: "Secteur ciblé",
                presented_by: "Présenté par",
                contact: "Contact",
                thanks: "Merci pour votre attention !",
                questions: "Questions & Discussion",
            },
            Locale::En => Labels {
                cover_letter_title: "Cover letter",
                recipient_department: "Human Resources",
                subject_prefix: "Subject:",
                subject: "Application for the position of",
                closing: "Kind regards,",
                target_sector: "Target sector",
                presented_by: "Presented by",
                contact: "Contact",
                thanks: "Thank you for your attention!",
                questions: "Questions & Discussion",
            },
        }
    }
}

fn lang(locale: Locale) -> &'static str {
    match locale {
        Locale::Fr => "fr",
        Locale::En => "en",
    }
}

#[derive(Debug, Serialize)]
struct ApplicantView {
    name: String,
    contact: Vec<String>,
}

pub struct TemplateRenderer {
    env: Environment<'static>,
    fixed_date: Option<NaiveDate>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self, AppError> {
        let mut env = Environment::new();
        let templates = [
            ("_blocks.html", include_str!("templates/_blocks.html")),
            ("cover_letter.html", include_str!("templates/cover_letter.html")),
            ("cv.html", include_str!("templates/cv.html")),
            ("pitch_deck.html", include_str!("templates/pitch_deck.html")),
        ];
        for (name, source) in templates {
            env.add_template(name, source)
                .map_err(|e| AppError::Render(format!("template {name} failed to load: {e}")))?;
        }
        Ok(Self {
            env,
            fixed_date: None,
        })
    }

    /// Pins the render date (the default is today's local date).
    #[cfg(test)]
    pub fn with_fixed_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    fn today(&self) -> NaiveDate {
        self.fixed_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Renders one document. `style` only affects CVs and defaults to modern.
    pub fn render(
        &self,
        kind: DocumentKind,
        synthesized: &str,
        metadata: &RenderMetadata,
        style: Option<CvStyle>,
    ) -> Result<RenderedDocument, AppError> {
        let today = self.today();
        let labels = Labels::for_locale(metadata.locale);
        let applicant = ApplicantView {
            name: require(kind, "applicant_name", &metadata.applicant_name)?.to_string(),
            contact: contact_lines(metadata),
        };

        let (markup, pages, style) = match kind {
            DocumentKind::CoverLetter => {
                let company = require(kind, "company_name", &metadata.company_name)?;
                let position = require(kind, "position_title", &metadata.position_title)?;
                let date = dates::long_date(today, metadata.locale);
                let body = parse_blocks(synthesized);

                let markup = self.render_template(
                    "cover_letter.html",
                    context! {
                        lang => lang(metadata.locale),
                        labels => &labels,
                        applicant => &applicant,
                        date => &date,
                        company_name => company,
                        position_title => position,
                        blocks => &body,
                    },
                )?;

                let mut blocks = vec![Block::Title(applicant.name.clone())];
                blocks.extend(applicant.contact.iter().cloned().map(Block::Meta));
                blocks.push(Block::Spacer);
                blocks.push(Block::Meta(date));
                blocks.push(Block::Spacer);
                blocks.push(Block::Heading(company.to_string()));
                blocks.push(Block::Paragraph(labels.recipient_department.to_string()));
                blocks.push(Block::Spacer);
                blocks.push(Block::Heading(format!(
                    "{} {} {}",
                    labels.subject_prefix, labels.subject, position
                )));
                blocks.extend(body);
                blocks.push(Block::Spacer);
                blocks.push(Block::Paragraph(labels.closing.to_string()));
                blocks.push(Block::Heading(applicant.name.clone()));

                (markup, vec![Page::new(PageRole::Flow, blocks)], None)
            }
            DocumentKind::Cv => {
                let sector = require(kind, "sector", &metadata.sector)?;
                let style = style.unwrap_or_default();
                let body = parse_blocks(synthesized);

                let markup = self.render_template(
                    "cv.html",
                    context! {
                        lang => lang(metadata.locale),
                        labels => &labels,
                        applicant => &applicant,
                        style => style.as_str(),
                        sector => sector,
                        blocks => &body,
                    },
                )?;

                let mut blocks = vec![Block::Title(applicant.name.clone())];
                if !applicant.contact.is_empty() {
                    blocks.push(Block::Meta(applicant.contact.join(" | ")));
                }
                blocks.push(Block::Meta(format!("{} : {}", labels.target_sector, sector)));
                blocks.push(Block::Spacer);
                blocks.extend(body);

                (markup, vec![Page::new(PageRole::Flow, blocks)], Some(style))
            }
            DocumentKind::PitchDeck => {
                let project_name = require(kind, "project_name", &metadata.project_name)?;
                let description =
                    require(kind, "project_description", &metadata.project_description)?;
                let month_year = dates::month_year(today, metadata.locale);
                let slides = deck_slides(synthesized, &metadata.key_points)?;

                let markup = self.render_template(
                    "pitch_deck.html",
                    context! {
                        lang => lang(metadata.locale),
                        labels => &labels,
                        applicant => &applicant,
                        project_name => project_name,
                        project_description => description,
                        month_year => &month_year,
                        slides => &slides,
                    },
                )?;

                let mut pages = Vec::with_capacity(slides.len() + 2);
                pages.push(Page::new(
                    PageRole::TitleSlide,
                    vec![
                        Block::Title(project_name.to_string()),
                        Block::Paragraph(description.to_string()),
                        Block::Spacer,
                        Block::Meta(format!("{} {}", labels.presented_by, applicant.name)),
                        Block::Meta(month_year),
                    ],
                ));
                for slide in slides {
                    let mut blocks = vec![Block::Heading(slide.title)];
                    blocks.extend(slide.blocks);
                    pages.push(Page::new(PageRole::ContentSlide, blocks));
                }
                let mut contact = vec![
                    Block::Heading(labels.contact.to_string()),
                    Block::Paragraph(applicant.name.clone()),
                ];
                contact.extend(applicant.contact.iter().cloned().map(Block::Meta));
                contact.push(Block::Spacer);
                contact.push(Block::Paragraph(labels.thanks.to_string()));
                contact.push(Block::Meta(labels.questions.to_string()));
                pages.push(Page::new(PageRole::ContactSlide, contact));

                (markup, pages, None)
            }
            DocumentKind::ApplicationBundle => {
                return Err(AppError::Render(
                    "application bundles are assembled, not rendered".to_string(),
                ));
            }
        };

        Ok(RenderedDocument {
            kind,
            markup,
            pages,
            metadata: metadata.clone(),
            style,
            rendered_on: today,
        })
    }

    fn render_template(&self, name: &str, ctx: minijinja::Value) -> Result<String, AppError> {
        self.env
            .get_template(name)
            .and_then(|t| t.render(ctx))
            .map_err(|e| AppError::Render(format!("{name}: {e}")))
    }
}

fn deck_slides(synthesized: &str, key_points: &[String]) -> Result<Vec<Slide>, AppError> {
    let slides = parse_slides(synthesized);
    if !slides.is_empty() {
        return Ok(slides);
    }
    let fallback: Vec<Slide> = key_points
        .iter()
        .map(|point| point.trim())
        .filter(|point| !point.is_empty())
        .map(|point| Slide {
            title: point.to_string(),
            blocks: Vec::new(),
        })
        .collect();
    if fallback.is_empty() {
        return Err(AppError::SynthesisUnavailable(
            "synthesized deck has no content slides".to_string(),
        ));
    }
    warn!(
        slides = fallback.len(),
        "synthesized deck had no content slides; using key points"
    );
    Ok(fallback)
}

fn require<'a>(
    kind: DocumentKind,
    field: &str,
    value: &'a Option<String>,
) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Render(format!(
            "{kind} template requires metadata field '{field}'"
        ))),
    }
}

fn contact_lines(metadata: &RenderMetadata) -> Vec<String> {
    [&metadata.email, &metadata.phone, &metadata.address]
        .into_iter()
        .filter_map(|v| v.as_deref().map(str::trim))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new()
            .unwrap()
            .with_fixed_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    fn metadata() -> RenderMetadata {
        RenderMetadata {
            applicant_name: Some("Awa Diop".to_string()),
            email: Some("awa@example.com".to_string()),
            phone: Some("+221 77 000 00 00".to_string()),
            company_name: Some("Acme".to_string()),
            position_title: Some("Lead".to_string()),
            sector: Some("Agritech".to_string()),
            project_name: Some("AgriSense".to_string()),
            project_description: Some("Soil sensors for smallholders".to_string()),
            target_audience: Some("Investors".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_cover_letter_contains_date_and_names() {
        let doc = renderer()
            .render(DocumentKind::CoverLetter, "Madame, Monsieur,\n\nJe postule.", &metadata(), None)
            .unwrap();
        assert!(doc.markup.contains("19 octobre 2026"));
        assert!(doc.markup.contains("Acme"));
        assert!(doc.markup.contains("Lead"));
        assert!(doc.markup.contains("Awa Diop"));
        assert_eq!(doc.pages.len(), 1);
        let text = doc.pages[0].plain_text();
        assert!(text.contains("19 octobre 2026"));
        assert!(text.contains("Je postule."));
    }

    #[test]
    fn test_cover_letter_english_date() {
        let mut meta = metadata();
        meta.locale = Locale::En;
        let doc = renderer()
            .render(DocumentKind::CoverLetter, "Dear team,", &meta, None)
            .unwrap();
        assert!(doc.markup.contains("October 19, 2026"));
        assert!(doc.markup.contains("Kind regards,"));
    }

    #[test]
    fn test_synthesized_markup_is_escaped() {
        let doc = renderer()
            .render(DocumentKind::CoverLetter, "<script>alert(1)</script>", &metadata(), None)
            .unwrap();
        assert!(!doc.markup.contains("<script>"));
        assert!(doc.markup.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_cv_styles_change_presentation_not_content() {
        let r = renderer();
        let text = "# Expérience\n- Agronome chez SenAgri";
        let modern = r
            .render(DocumentKind::Cv, text, &metadata(), Some(CvStyle::Modern))
            .unwrap();
        let classic = r
            .render(DocumentKind::Cv, text, &metadata(), Some(CvStyle::Classic))
            .unwrap();
        let creative = r
            .render(DocumentKind::Cv, text, &metadata(), Some(CvStyle::Creative))
            .unwrap();

        assert_ne!(modern.markup, classic.markup);
        assert_ne!(classic.markup, creative.markup);
        assert!(modern.markup.contains("template-modern"));
        assert!(creative.markup.contains("template-creative"));
        // the PDF encoder themes pages by `style`; the blocks stay shared
        assert_eq!(modern.pages, classic.pages);
        assert_eq!(classic.pages, creative.pages);
        assert_eq!(modern.style, Some(CvStyle::Modern));
        assert_eq!(classic.style, Some(CvStyle::Classic));
        assert_eq!(creative.style, Some(CvStyle::Creative));
    }

    #[test]
    fn test_cv_defaults_to_modern() {
        let doc = renderer()
            .render(DocumentKind::Cv, "Profil", &metadata(), None)
            .unwrap();
        assert_eq!(doc.style, Some(CvStyle::Modern));
    }

    #[test]
    fn test_pitch_deck_frames_slides() {
        let doc = renderer()
            .render(
                DocumentKind::PitchDeck,
                "# Problem\nLow yields\n---\n# Solution\n- Sensors\n---\n# Contact\nx",
                &metadata(),
                None,
            )
            .unwrap();

        let roles: Vec<PageRole> = doc.pages.iter().map(|p| p.role).collect();
        assert_eq!(
            roles,
            vec![
                PageRole::TitleSlide,
                PageRole::ContentSlide,
                PageRole::ContentSlide,
                PageRole::ContactSlide,
            ]
        );
        let title = doc.pages[0].plain_text();
        assert!(title.contains("AgriSense"));
        assert!(title.contains("Présenté par Awa Diop"));
        assert!(title.contains("octobre 2026"));
        assert!(doc.pages[3].plain_text().contains("awa@example.com"));
        assert_eq!(doc.markup.matches("class=\"slide title-slide\"").count(), 1);
        assert_eq!(doc.markup.matches("class=\"slide contact-slide\"").count(), 1);
        assert_eq!(doc.markup.matches("class=\"slide content-slide\"").count(), 2);
    }

    #[test]
    fn test_empty_deck_uses_key_points_as_slides() {
        let mut meta = metadata();
        meta.key_points = vec!["Sensors".to_string(), " ".to_string(), "Market".to_string()];
        let doc = renderer()
            .render(DocumentKind::PitchDeck, "---\n---\n# Contact\nx", &meta, None)
            .unwrap();

        let roles: Vec<PageRole> = doc.pages.iter().map(|p| p.role).collect();
        assert_eq!(
            roles,
            vec![
                PageRole::TitleSlide,
                PageRole::ContentSlide,
                PageRole::ContentSlide,
                PageRole::ContactSlide,
            ]
        );
        assert_eq!(doc.pages[1].blocks, vec![Block::Heading("Sensors".to_string())]);
        assert_eq!(doc.pages[2].blocks, vec![Block::Heading("Market".to_string())]);
    }

    #[test]
    fn test_empty_deck_without_key_points_is_unavailable() {
        let err = renderer()
            .render(DocumentKind::PitchDeck, "\n---\n", &metadata(), None)
            .unwrap_err();
        assert!(matches!(err, AppError::SynthesisUnavailable(_)));
    }

    #[test]
    fn test_missing_required_metadata_is_render_error() {
        let mut meta = metadata();
        meta.company_name = None;
        let err = renderer()
            .render(DocumentKind::CoverLetter, "x", &meta, None)
            .unwrap_err();
        assert!(matches!(err, AppError::Render(msg) if msg.contains("company_name")));

        let mut meta = metadata();
        meta.applicant_name = Some("   ".to_string());
        let err = renderer()
            .render(DocumentKind::Cv, "x", &meta, None)
            .unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }

    #[test]
    fn test_bundle_kind_is_not_renderable() {
        let err = renderer()
            .render(DocumentKind::ApplicationBundle, "x", &metadata(), None)
            .unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }
}
