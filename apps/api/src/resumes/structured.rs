//! Structured extraction — pluggable, trait-based conversion of document text into the resume schema.
//!
//! Default: `LlmStructuredExtractor` (one inference call, then the recovery chain).
//! `AppState` holds an `Arc<dyn StructuredExtractor>` so tests can inject canned responses.

use async_trait::async_trait;
use tracing::info;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::resume::truncate_chars;
use crate::resumes::prompts::build_resume_prompt;
use crate::resumes::recovery::{recover_resume, ParseOutcome};

const LOGGED_RESPONSE_CHARS: usize = 500;

#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    /// Transport and provider failures are errors; unusable output is `ParseOutcome::Unrecoverable`.
    async fn extract(&self, text: &str) -> Result<ParseOutcome, LlmError>;
}

pub struct LlmStructuredExtractor(pub LlmClient);

#[async_trait]
impl StructuredExtractor for LlmStructuredExtractor {
    async fn extract(&self, text: &str) -> Result<ParseOutcome, LlmError> {
        let prompt = build_resume_prompt(text);
        let raw = self.0.complete(&prompt, JSON_ONLY_SYSTEM).await?;
        info!(
            "LLM output received (truncated): {}",
            truncate_chars(&raw, LOGGED_RESPONSE_CHARS)
        );
        Ok(recover_resume(&raw))
    }
}

/// Returns a fixed model response, run through the same recovery chain.
#[cfg(test)]
pub(crate) struct CannedExtractor(pub String);

#[cfg(test)]
#[async_trait]
impl StructuredExtractor for CannedExtractor {
    async fn extract(&self, _text: &str) -> Result<ParseOutcome, LlmError> {
        Ok(recover_resume(&self.0))
    }
}

/// Always fails as if the provider were down.
#[cfg(test)]
pub(crate) struct FailingExtractor;

#[cfg(test)]
#[async_trait]
impl StructuredExtractor for FailingExtractor {
    async fn extract(&self, _text: &str) -> Result<ParseOutcome, LlmError> {
        Err(LlmError::Api {
            status: 503,
            message: "provider unavailable".to_string(),
        })
    }
}
