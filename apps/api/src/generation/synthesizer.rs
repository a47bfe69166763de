use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::prompts::DOCUMENT_WRITER_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("synthesis provider unavailable: {0}")]
    Unavailable(String),

    #[error("synthesis provider returned no content")]
    Empty,
}

impl From<SynthesisError> for AppError {
    fn from(e: SynthesisError) -> Self {
        AppError::SynthesisUnavailable(e.to_string())
    }
}

/// Turns a prompt into document text. One awaited call; no retries.
#[async_trait]
pub trait ContentSynthesizer: Send + Sync {
    async fn synthesize(&self, prompt: &str, correlation_id: Uuid) -> Result<String, SynthesisError>;
}

#[async_trait]
impl ContentSynthesizer for LlmClient {
    async fn synthesize(&self, prompt: &str, correlation_id: Uuid) -> Result<String, SynthesisError> {
        match self.call_text(prompt, DOCUMENT_WRITER_SYSTEM).await {
            Ok(text) => {
                info!(%correlation_id, chars = text.len(), "Synthesis completed");
                Ok(text)
            }
            Err(LlmError::EmptyContent) => {
                warn!(%correlation_id, "Synthesis returned empty content");
                Err(SynthesisError::Empty)
            }
            Err(e) => {
                warn!(%correlation_id, "Synthesis failed: {e}");
                Err(SynthesisError::Unavailable(e.to_string()))
            }
        }
    }
}
