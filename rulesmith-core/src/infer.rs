//! Inference aggregator: fuses both evidence sources into rules.
//!
//! [`RuleInferencer::infer_rules`] is the sole public entry point of the
//! pipeline. It makes a single strictly sequential pass over the
//! model × field cross product: relations are skipped, the statistical
//! analyzer always runs, and classifier-eligible string fields
//! additionally go through the rate scheduler to the pattern recognizer.
//! Per-field evidence failures degrade silently to "no contribution";
//! only the upfront connectivity check can fail the run.

use serde_json::Value as JsonValue;
use serde_json::json;

use crate::classifier::ClassifierClient;
use crate::config::InferenceConfig;
use crate::models::{Field, FieldKind, FieldStats, Model, PatternInference, RuleMap, ValidationRule};
use crate::recognizer::PatternRecognizer;
use crate::stats::StatsAnalyzer;
use crate::store::DataStore;
use crate::throttle::RateLimiter;
use crate::{Result, error::RulesmithError};

/// Example values carried per rule.
const EXAMPLES_CAP: usize = 5;

/// Accumulates evidence for one field into a rule.
///
/// The slots are disjoint by construction: `min`/`max` are exclusively
/// statistics-sourced and `pattern` is exclusively classifier-sourced, so
/// neither evidence source can overwrite the other.
struct RuleBuilder<'a> {
    field: &'a Field,
    min: Option<JsonValue>,
    max: Option<JsonValue>,
    pattern: Option<String>,
    examples: Vec<JsonValue>,
}

impl<'a> RuleBuilder<'a> {
    fn new(field: &'a Field) -> Self {
        Self {
            field,
            min: None,
            max: None,
            pattern: None,
            examples: Vec::new(),
        }
    }

    /// Copies statistical evidence into the bound slots.
    ///
    /// Numeric value range and string length range share the same
    /// `min`/`max` slots; consumers disambiguate via the declared type.
    fn apply_stats(&mut self, stats: &FieldStats) {
        if stats.min.is_some() || stats.max.is_some() {
            self.min = stats.min.clone();
            self.max = stats.max.clone();
        } else if stats.min_length.is_some() || stats.max_length.is_some() {
            self.min = stats.min_length.map(|l| json!(l));
            self.max = stats.max_length.map(|l| json!(l));
        }

        if let Some(values) = &stats.distinct_values {
            self.push_examples(values.iter().cloned());
        }
    }

    /// Copies classifier evidence into the pattern slot.
    fn apply_pattern(&mut self, inference: &PatternInference) {
        if let Some(pattern) = &inference.pattern {
            self.pattern = Some(pattern.clone());
        }
    }

    /// Records example values from whichever evidence produced them.
    fn push_examples(&mut self, values: impl Iterator<Item = JsonValue>) {
        for value in values {
            if self.examples.len() == EXAMPLES_CAP {
                break;
            }
            self.examples.push(value);
        }
    }

    /// Materializes the rule, or `None` when no evidence was found.
    ///
    /// A field with no discovered evidence contributes nothing and is
    /// indistinguishable in the output from a field never analyzed.
    fn build(self) -> Option<ValidationRule> {
        if self.min.is_none() && self.max.is_none() && self.pattern.is_none() {
            return None;
        }

        Some(ValidationRule {
            field: self.field.name.clone(),
            field_type: self.field.field_type.clone(),
            min: self.min,
            max: self.max,
            pattern: self.pattern,
            nullable: !self.field.is_required,
            unique: self.field.is_unique,
            examples: self.examples,
        })
    }
}

/// The inference pipeline over a data store and a classifier backend.
pub struct RuleInferencer {
    store: Box<dyn DataStore>,
    classifier: Box<dyn ClassifierClient>,
    config: InferenceConfig,
}

impl RuleInferencer {
    /// Creates an inferencer owning its run collaborators.
    pub fn new(
        store: Box<dyn DataStore>,
        classifier: Box<dyn ClassifierClient>,
        config: InferenceConfig,
    ) -> Self {
        Self {
            store,
            classifier,
            config,
        }
    }

    /// Infers validation rules for every model in the catalog.
    ///
    /// Models appear in the output only with a non-empty rule list.
    /// Output ordering is deterministic: identical evidence yields
    /// byte-identical serialized maps.
    ///
    /// # Errors
    /// Fails only when the data store is unreachable for the entire run.
    /// Per-field evidence failures are logged and degrade to missing
    /// evidence.
    pub async fn infer_rules(&self, models: &[Model]) -> Result<RuleMap> {
        self.store.test_connection().await.map_err(|e| match e {
            RulesmithError::Connection { context, source } => RulesmithError::Connection {
                context: format!("Cannot start inference run: {context}"),
                source,
            },
            other => other,
        })?;

        let analyzer = StatsAnalyzer::new(self.store.as_ref());
        let recognizer = PatternRecognizer::new(self.classifier.as_ref());
        let mut limiter = RateLimiter::new(self.config.requests_per_minute);

        let mut rule_map = RuleMap::new();

        for model in models {
            tracing::debug!(model = %model.name, "inferring rules");
            let mut rules = Vec::new();

            for field in &model.fields {
                if field.kind == FieldKind::Relation {
                    continue;
                }

                let stats = analyzer.analyze(model, field).await;
                let mut builder = RuleBuilder::new(field);
                builder.apply_stats(&stats);

                if field.is_classifier_eligible() {
                    let sample = self.fetch_classifier_sample(model, field).await;
                    if !sample.is_empty() {
                        builder.push_examples(sample.iter().map(|v| json!(v)));
                    }
                    if let Some(inference) = recognizer
                        .infer_pattern(&mut limiter, &model.name, &field.name, &sample)
                        .await
                    {
                        builder.apply_pattern(&inference);
                    }
                }

                if let Some(rule) = builder.build() {
                    rules.push(rule);
                }
            }

            if !rules.is_empty() {
                rule_map.insert(model.name.clone(), rules);
            }
        }

        tracing::info!(
            models = rule_map.len(),
            rules = rule_map.values().map(Vec::len).sum::<usize>(),
            "inference run completed"
        );

        Ok(rule_map)
    }

    /// Fetches the fresh bounded distinct-value sample submitted to the
    /// classifier. A store failure here degrades to an empty sample,
    /// which the recognizer treats as "nothing to classify".
    async fn fetch_classifier_sample(&self, model: &Model, field: &Field) -> Vec<String> {
        match self
            .store
            .distinct_strings(
                model.table_name(),
                field.column_name(),
                self.config.sample_size,
            )
            .await
        {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!(
                    model = %model.name,
                    field = %field.name,
                    error = %e,
                    "classifier sample fetch failed"
                );
                Vec::new()
            }
        }
    }
}
