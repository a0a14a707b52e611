//! Outbound text generation.
//!
//! [`TextGenerator`] is the seam the coaching service depends on. The HTTP
//! client lives in [`openai`], bounded retries in [`retry`] and reply parsing
//! in [`sections`].

pub mod openai;
pub mod retry;
pub mod sections;

use std::time::Duration;

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::error::AppResult;

pub use openai::OpenAiClient;
pub use retry::{RetryError, RetryPolicy};
pub use sections::{ParsedSections, json_array_slice, parse_sections};

pub const SERVICE_NAME: &str = "text-generation";

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_instructions: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Per-attempt deadline.
    pub timeout: Duration,
}

impl GenerationRequest {
    pub fn new(
        config: &LlmConfig,
        system_instructions: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            system_instructions: system_instructions.into(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the generated free text.
    async fn generate(&self, request: &GenerationRequest) -> AppResult<String>;
}
