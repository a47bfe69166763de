use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Applicant profile, owned by the profile subsystem. Read-only here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct ApplicantProfile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin_profile: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub languages: Option<String>,
}

impl ApplicantProfile {
    /// "First Last", trimmed so a missing half does not leave stray spaces.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Funding / job opportunity the applicant is targeting. Read-only here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct OpportunityRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Issuing organisation, when the upstream source knows it.
    pub organization: Option<String>,
    pub sectors: Vec<String>,
    /// Free-text amount as published ("50 000 EUR", "up to $10k").
    pub amount: Option<String>,
    pub deadline: Option<NaiveDate>,
}

impl OpportunityRecord {
    pub fn primary_sector(&self) -> Option<&str> {
        self.sectors
            .iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

/// Renders an optional free-text field as an empty string when absent.
pub fn or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}
