// src/provider/mod.rs

pub mod openai;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;

pub use openai::OpenAiGenerator;

/// Failures while producing quiz or recommendation content.
///
/// Everything except `MissingLearner` and `History` is recoverable: the
/// caller may simply ask again.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Learner identity is required")]
    MissingLearner,

    #[error("Generation provider unavailable: {0}")]
    Unavailable(String),

    #[error("Generation provider timed out after {0}s")]
    Timeout(u64),

    #[error("Generation provider returned no content")]
    EmptyResponse,

    #[error("Generated quiz is not valid JSON: {0}")]
    MalformedJson(String),

    #[error("Generated question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: String },

    #[error("Failed to read quiz history: {0}")]
    History(#[from] AppError),
}

/// Parameters handed to the text-generation provider.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: 0.7,
        }
    }
}

/// Capability: generate text for a prompt.
///
/// Injected into the generator so tests can substitute a deterministic stub.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Calls the provider under a request-level deadline.
pub async fn generate_within(
    provider: &dyn TextGenerator,
    request: &GenerationRequest,
    timeout: Duration,
) -> Result<String, GenerationError> {
    match tokio::time::timeout(timeout, provider.generate(request)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Generation provider exceeded {:?}", timeout);
            Err(GenerationError::Timeout(timeout.as_secs()))
        }
    }
}
