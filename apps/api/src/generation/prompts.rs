// Prompt templates for document synthesis.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::errors::AppError;
use crate::generation::request::{CoverLetterParams, CvParams, PitchDeckParams};
use crate::llm_client::prompts::FACTUALITY_INSTRUCTION;
use crate::models::document::Locale;
use crate::models::profile::{or_empty, ApplicantProfile, OpportunityRecord};

/// Cover letter prompt. Replace: {language}, {name}, {email}, {phone}, {skills},
/// {experience}, {company_name}, {position_title}, {opportunity_title},
/// {opportunity_description}, {sector}, {additional_info}, {factuality}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"Write a professional cover letter in {language}.

Applicant:
- Name: {name}
- Email: {email}
- Phone: {phone}
- Skills: {skills}
- Experience: {experience}

Opportunity:
- Company: {company_name}
- Position: {position_title}
- Opportunity: {opportunity_title}
- Description: {opportunity_description}
- Sector: {sector}

Additional information: {additional_info}

Write only the body of the letter, from the salutation to the last paragraph before the
closing formula. The sender block, date, recipient, subject line and signature are added
by the layout. The letter must be personalised and highlight the skills most relevant to
the position.

{factuality}"#;

/// CV prompt. Replace: {language}, {sector}, {name}, {email}, {phone}, {address},
/// {skills}, {experience}, {education}, {languages}, {factuality}
pub const CV_PROMPT_TEMPLATE: &str = r#"Write the content of a professional CV in {language}, optimised for the '{sector}' sector.

Applicant:
- Name: {name}
- Email: {email}
- Phone: {phone}
- Address: {address}
- Skills: {skills}
- Experience: {experience}
- Education: {education}
- Languages: {languages}

Structure the CV in sections with '#' headings (profile, experience, education, skills,
languages) and '-' bullets. Do not repeat the name and contact details: the layout's
header already shows them. Put forward what matters most for the '{sector}' sector.

{factuality}"#;

/// Pitch deck prompt. Replace: {language}, {project_name}, {project_description},
/// {target_audience}, {key_points}, {factuality}
pub const PITCH_DECK_PROMPT_TEMPLATE: &str = r#"Write the content of a professional pitch deck in {language}.

Project: {project_name}
Description: {project_description}
Target audience: {target_audience}
Key points:
{key_points}

Produce one slide per key point, in the order given, followed where relevant by slides on
the problem, solution, target market, business model, competition, team, roadmap and
funding. Do not write a title slide or a contact slide: the layout adds both.

Separate slides with a line containing only '---'. The first line of each slide is its
title; the following lines are short paragraphs or '-' bullets.

{factuality}"#;

/// Single-pass `{name}` substitution.
///
/// Values are inserted verbatim and never rescanned, so user text containing braces
/// cannot inject further placeholders. Unknown placeholders are left as-is.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let replaced = after.find('}').and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });
        match replaced {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn require<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value)
}

pub fn build_cover_letter_prompt(
    profile: &ApplicantProfile,
    opportunity: &OpportunityRecord,
    params: &CoverLetterParams,
    locale: Locale,
) -> Result<String, AppError> {
    let name = profile.full_name();
    let name = require(&name, "applicant name")?;
    let company_name = require(&params.company_name, "company_name")?;
    let position_title = require(&params.position_title, "position_title")?;

    Ok(fill(
        COVER_LETTER_PROMPT_TEMPLATE,
        &[
            ("language", locale.language_name()),
            ("name", name),
            ("email", or_empty(&profile.email)),
            ("phone", or_empty(&profile.phone)),
            ("skills", or_empty(&profile.skills)),
            ("experience", or_empty(&profile.experience)),
            ("company_name", company_name),
            ("position_title", position_title),
            ("opportunity_title", opportunity.title.trim()),
            ("opportunity_description", or_empty(&opportunity.description)),
            ("sector", opportunity.primary_sector().unwrap_or("")),
            ("additional_info", or_empty(&params.additional_info)),
            ("factuality", FACTUALITY_INSTRUCTION),
        ],
    ))
}

pub fn build_cv_prompt(
    profile: &ApplicantProfile,
    params: &CvParams,
    locale: Locale,
) -> Result<String, AppError> {
    let name = profile.full_name();
    let name = require(&name, "applicant name")?;
    let sector = require(&params.sector, "sector")?;

    Ok(fill(
        CV_PROMPT_TEMPLATE,
        &[
            ("language", locale.language_name()),
            ("sector", sector),
            ("name", name),
            ("email", or_empty(&profile.email)),
            ("phone", or_empty(&profile.phone)),
            ("address", or_empty(&profile.address)),
            ("skills", or_empty(&profile.skills)),
            ("experience", or_empty(&profile.experience)),
            ("education", or_empty(&profile.education)),
            ("languages", or_empty(&profile.languages)),
            ("factuality", FACTUALITY_INSTRUCTION),
        ],
    ))
}

pub fn build_pitch_deck_prompt(params: &PitchDeckParams, locale: Locale) -> Result<String, AppError> {
    let project_name = require(&params.project_name, "project_name")?;
    let project_description = require(&params.project_description, "project_description")?;
    let target_audience = require(&params.target_audience, "target_audience")?;
    if params.key_points.is_empty() {
        return Err(AppError::Validation("key_points is required".to_string()));
    }
    let key_points = params
        .key_points
        .iter()
        .enumerate()
        .map(|(i, point)| format!("{}. {}", i + 1, point.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(fill(
        PITCH_DECK_PROMPT_TEMPLATE,
        &[
            ("language", locale.language_name()),
            ("project_name", project_name),
            ("project_description", project_description),
            ("target_audience", target_audience),
            ("key_points", &key_points),
            ("factuality", FACTUALITY_INSTRUCTION),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile() -> ApplicantProfile {
        ApplicantProfile {
            first_name: "Awa".to_string(),
            last_name: "Diop".to_string(),
            email: Some("awa@example.com".to_string()),
            skills: Some("Agronomie, SIG".to_string()),
            ..Default::default()
        }
    }

    fn cover_letter_params() -> CoverLetterParams {
        CoverLetterParams {
            opportunity_id: Uuid::new_v4(),
            company_name: "Acme".to_string(),
            position_title: "Lead".to_string(),
            additional_info: None,
        }
    }

    #[test]
    fn test_fill_is_single_pass() {
        let out = fill(
            "{a} and {b} and {unknown}",
            &[("a", "{b}"), ("b", "B")],
        );
        assert_eq!(out, "{b} and B and {unknown}");
    }

    #[test]
    fn test_fill_handles_unclosed_brace() {
        assert_eq!(fill("x { y", &[("y", "z")]), "x { y");
    }

    #[test]
    fn test_cover_letter_prompt_is_deterministic() {
        let opportunity = OpportunityRecord {
            title: "Programme Agritech".to_string(),
            sectors: vec!["Agriculture".to_string()],
            ..Default::default()
        };
        let a = build_cover_letter_prompt(&profile(), &opportunity, &cover_letter_params(), Locale::Fr)
            .unwrap();
        let b = build_cover_letter_prompt(&profile(), &opportunity, &cover_letter_params(), Locale::Fr)
            .unwrap();
        assert_eq!(a, b);
        assert!(a.contains("in French"));
        assert!(a.contains("- Name: Awa Diop"));
        assert!(a.contains("- Company: Acme"));
        assert!(a.contains("- Sector: Agriculture"));
        // missing optional fields render empty
        assert!(a.contains("- Phone: \n"));
        assert!(a.contains("Additional information: \n"));
        assert!(!a.contains('{'));
    }

    #[test]
    fn test_cover_letter_prompt_requires_company() {
        let mut params = cover_letter_params();
        params.company_name = " ".to_string();
        let err = build_cover_letter_prompt(&profile(), &OpportunityRecord::default(), &params, Locale::Fr)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_cv_prompt_requires_applicant_name() {
        let params = CvParams {
            sector: "Finance".to_string(),
            style: Default::default(),
        };
        let err = build_cv_prompt(&ApplicantProfile::default(), &params, Locale::En).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let prompt = build_cv_prompt(&profile(), &params, Locale::En).unwrap();
        assert!(prompt.contains("in English"));
        assert!(prompt.contains("'Finance' sector"));
    }

    #[test]
    fn test_pitch_deck_prompt_numbers_key_points() {
        let params = PitchDeckParams {
            project_name: "AgriSense".to_string(),
            project_description: "Soil sensors".to_string(),
            target_audience: "Investors".to_string(),
            key_points: vec!["Problem".into(), "Solution".into(), "Market".into()],
        };
        let prompt = build_pitch_deck_prompt(&params, Locale::Fr).unwrap();
        assert!(prompt.contains("1. Problem\n2. Solution\n3. Market"));
        assert!(prompt.contains("'---'"));
    }
}
