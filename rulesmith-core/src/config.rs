//! Inference run configuration.
//!
//! Controls the classifier sample cap, the classifier backend identity,
//! and the rate budget against the metered classification service. The
//! statistical string-sampling cap is internal and not user-configurable.

use serde::{Deserialize, Serialize};

/// Rows fetched when computing string length bounds.
///
/// Exact length bounds would require scanning every value; a capped sample
/// trades exactness for bounded cost on large tables.
pub const STRING_STATS_SAMPLE_CAP: u32 = 1000;

/// Unique values submitted to the classifier per field, regardless of how
/// many were sampled.
pub const CLASSIFIER_SAMPLE_CAP: usize = 50;

/// Conservative fallback when no request budget is configured.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 10;

/// Configuration for one inference run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Distinct values fetched per string field for classification
    pub sample_size: u32,
    /// Classifier backend provider (currently only "ollama")
    pub ai_provider: String,
    /// Classifier model name
    pub ai_model: String,
    /// Classifier endpoint base URL
    pub ai_endpoint: String,
    /// Optional override of the classifier request budget
    pub requests_per_minute: Option<u32>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            sample_size: 50,
            ai_provider: "ollama".to_string(),
            ai_model: "llama3.2".to_string(),
            ai_endpoint: "http://localhost:11434".to_string(),
            requests_per_minute: None,
        }
    }
}

impl InferenceConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the classifier sample size.
    pub fn with_sample_size(mut self, size: u32) -> Self {
        self.sample_size = size;
        self
    }

    /// Builder method to select the classifier backend.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.ai_provider = provider.into();
        self
    }

    /// Builder method to select the classifier model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.ai_model = model.into();
        self
    }

    /// Builder method to set the classifier endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.ai_endpoint = endpoint.into();
        self
    }

    /// Builder method to override the request budget.
    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = Some(rpm);
        self
    }
}
