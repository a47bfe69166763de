//! Upstream read-only sources: applicant profiles and opportunities.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{ApplicantProfile, OpportunityRecord};

#[async_trait]
pub trait ProfileProvider: Send + Sync {
    /// `NotFound` when the user has no profile yet.
    async fn profile(&self, user_id: Uuid) -> Result<ApplicantProfile, AppError>;
}

#[async_trait]
pub trait OpportunityProvider: Send + Sync {
    async fn opportunity(&self, id: Uuid) -> Result<OpportunityRecord, AppError>;
}

/// Both providers backed by the shared PostgreSQL pool.
#[derive(Clone)]
pub struct PgProviders {
    pool: PgPool,
}

impl PgProviders {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileProvider for PgProviders {
    async fn profile(&self, user_id: Uuid) -> Result<ApplicantProfile, AppError> {
        sqlx::query_as::<_, ApplicantProfile>(
            r#"
            SELECT user_id, first_name, last_name, email, phone, address, location,
                   website, linkedin_profile, skills, experience, education, languages
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile for user {user_id} not found")))
    }
}

#[async_trait]
impl OpportunityProvider for PgProviders {
    async fn opportunity(&self, id: Uuid) -> Result<OpportunityRecord, AppError> {
        sqlx::query_as::<_, OpportunityRecord>(
            r#"
            SELECT id, title, description, organization, sectors, amount, deadline
            FROM opportunities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Opportunity {id} not found")))
    }
}
