//! Ollama backend for the pattern classifier.
//!
//! Talks to an Ollama server's `/api/generate` endpoint with structured
//! JSON output enforced via `format: "json"`.
//!
//! # Example
//!
//! ```ignore
//! use rulesmith_core::classifier::ollama::OllamaClient;
//!
//! let client = OllamaClient::new("http://localhost:11434", "llama3.2")
//!     .with_timeout(60);
//! let raw = client.complete(SYSTEM_INSTRUCTION, "...").await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ClassifierClient;
use super::error::{ClassifierError, ClassifierResult};

/// Ollama API client.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    timeout_seconds: u64,
    temperature: f32,
    client: reqwest::Client,
}

/// Request body for the Ollama generate endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    /// Constrains the response to a JSON object
    format: &'a str,
    options: GenerateOptions,
}

/// Sampling options for generation.
#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response from the Ollama generate endpoint.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    total_duration: Option<u64>,
}

impl OllamaClient {
    /// Creates a new Ollama client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Model name to use (e.g., "llama3.2", "mistral")
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout_seconds: 120,
            // Low temperature: pattern classification wants determinism
            temperature: 0.1,
            client: reqwest::Client::new(),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ClassifierClient for OllamaClient {
    async fn complete(&self, system: &str, prompt: &str) -> ClassifierResult<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = GenerateRequest {
            model: &self.model,
            system,
            prompt,
            stream: false,
            format: "json",
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        tracing::debug!(%url, model = %self.model, "sending classification request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(std::time::Duration::from_secs(self.timeout_seconds))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout(self.timeout_seconds)
                } else if e.is_connect() {
                    ClassifierError::Connection(format!(
                        "Failed to connect to Ollama at {}: {}",
                        self.base_url, e
                    ))
                } else {
                    ClassifierError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(e.to_string()))?;

        if let Some(duration) = gen_response.total_duration {
            tracing::debug!(
                duration_ms = duration / 1_000_000,
                "classification completed"
            );
        }

        Ok(gen_response.response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let client = OllamaClient::new("http://localhost:11434", "llama3.2");
        assert_eq!(client.base_url(), "http://localhost:11434");
        assert_eq!(client.model_name(), "llama3.2");
        assert_eq!(client.timeout_seconds, 120);
    }

    #[test]
    fn test_client_builder() {
        let client = OllamaClient::new("http://remote:11434", "mistral")
            .with_timeout(60)
            .with_temperature(0.5);

        assert_eq!(client.timeout_seconds, 60);
        assert!((client.temperature - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_temperature_clamp() {
        let client = OllamaClient::new("http://localhost:11434", "llama3.2").with_temperature(5.0);
        assert!((client.temperature - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_generate_request_serialize() {
        let request = GenerateRequest {
            model: "llama3.2",
            system: "You are a data pattern analyst.",
            prompt: "{\"model\":\"User\"}",
            stream: false,
            format: "json",
            options: GenerateOptions { temperature: 0.1 },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("llama3.2"));
        assert!(json.contains("\"format\":\"json\""));
        assert!(json.contains("\"stream\":false"));
    }

    #[test]
    fn test_generate_response_deserialize() {
        let json = r#"{"response": "{\"pattern\": null}", "done": true, "total_duration": 1500000000}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.response, "{\"pattern\": null}");
        assert_eq!(response.total_duration, Some(1500000000));
    }

    #[test]
    fn test_generate_response_minimal() {
        let json = r#"{"response": "{}"}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert!(response.total_duration.is_none());
    }
}
