//! Generative classifier client trait and backend factory.
//!
//! The pattern recognizer talks to the external classification service
//! through the [`ClassifierClient`] trait, so tests and alternative
//! backends plug in without touching the pipeline.

pub mod ollama;
pub mod prompt;

mod error;

pub use error::{ClassifierError, ClassifierResult};

use async_trait::async_trait;

use crate::config::InferenceConfig;
use crate::error::{Result, RulesmithError};

/// Unified interface for classifier backends.
///
/// Implementations submit a fixed system instruction plus a user message
/// and return the raw structured-output text. They report failures as
/// [`ClassifierError`]; the recognizer decides how failures degrade.
#[async_trait]
pub trait ClassifierClient: Send + Sync {
    /// Submits a prompt and returns the raw response text.
    ///
    /// # Arguments
    /// * `system` - Fixed system instruction
    /// * `prompt` - User message embedding the field sample
    async fn complete(&self, system: &str, prompt: &str) -> ClassifierResult<String>;

    /// Model identifier used by this backend.
    fn model_name(&self) -> &str;
}

/// Creates a classifier client from the run configuration.
///
/// # Errors
/// Returns a configuration error if the provider is not recognized.
pub fn create_classifier(config: &InferenceConfig) -> Result<Box<dyn ClassifierClient>> {
    match config.ai_provider.as_str() {
        "ollama" => Ok(Box::new(ollama::OllamaClient::new(
            config.ai_endpoint.as_str(),
            config.ai_model.as_str(),
        ))),
        other => Err(RulesmithError::unsupported_backend(
            other,
            "recognized classifier providers: ollama",
        )),
    }
}
