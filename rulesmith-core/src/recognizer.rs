//! Pattern recognizer: probabilistic, classifier-derived evidence.
//!
//! Submits a deduplicated, size-bounded sample of a string field's values
//! to the external classifier and parses the structured result. This is
//! explicitly a best-effort evidence source: every failure mode — network
//! error, malformed output, an uncompilable regex — degrades to `None`
//! with a warning, and is never surfaced to the caller as an error.

use crate::classifier::{ClassifierClient, ClassifierError, prompt};
use crate::config::CLASSIFIER_SAMPLE_CAP;
use crate::models::PatternInference;
use crate::throttle::RateLimiter;

/// Recognizer over an external classifier backend.
pub struct PatternRecognizer<'a> {
    client: &'a dyn ClassifierClient,
}

impl<'a> PatternRecognizer<'a> {
    /// Creates a recognizer borrowing the run's classifier client.
    pub fn new(client: &'a dyn ClassifierClient) -> Self {
        Self { client }
    }

    /// Infers a pattern for one string field.
    ///
    /// Values are deduplicated preserving first-seen order and truncated
    /// to at most [`CLASSIFIER_SAMPLE_CAP`] samples, bounding classifier
    /// cost regardless of sample size. If no samples remain, returns
    /// `None` without contacting the service. The call is admitted
    /// through `limiter`, and completion is marked whether it succeeded
    /// or failed.
    pub async fn infer_pattern(
        &self,
        limiter: &mut RateLimiter,
        model_name: &str,
        field_name: &str,
        values: &[String],
    ) -> Option<PatternInference> {
        let samples = dedupe_and_cap(values, CLASSIFIER_SAMPLE_CAP);
        if samples.is_empty() {
            return None;
        }

        let message = prompt::build_user_message(model_name, field_name, &samples);

        limiter.acquire().await;
        let response = self
            .client
            .complete(prompt::SYSTEM_INSTRUCTION, &message)
            .await;
        limiter.mark();

        let raw = match response {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    model = model_name,
                    field = field_name,
                    error = %e,
                    "classifier call failed"
                );
                return None;
            }
        };

        let inference = match prompt::parse_response(&raw) {
            Ok(inference) => inference,
            Err(e) => {
                tracing::warn!(
                    model = model_name,
                    field = field_name,
                    error = %e,
                    "classifier output unusable"
                );
                return None;
            }
        };

        // A pattern that does not compile is malformed output
        if let Some(pattern) = &inference.pattern {
            if let Err(e) = regex::Regex::new(pattern) {
                let error = ClassifierError::InvalidPattern(format!("{pattern}: {e}"));
                tracing::warn!(
                    model = model_name,
                    field = field_name,
                    error = %error,
                    "classifier returned an uncompilable pattern"
                );
                return None;
            }
        }

        tracing::debug!(
            model = model_name,
            field = field_name,
            pattern = inference.pattern.as_deref().unwrap_or("<none>"),
            "pattern inference completed"
        );

        Some(inference)
    }
}

/// Deduplicates preserving first-seen order and truncates to `cap`
/// samples. Null filtering already happened at the store (`IS NOT NULL`),
/// and an empty string is a legitimate sample value.
fn dedupe_and_cap(values: &[String], cap: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut samples = Vec::new();
    for value in values {
        if seen.insert(value.as_str()) {
            samples.push(value.clone());
            if samples.len() == cap {
                break;
            }
        }
    }
    samples
}
