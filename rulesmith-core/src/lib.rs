//! Validation-rule inference for relational schemas.
//!
//! This crate infers, for every field of every model in a schema catalog,
//! a validation contract: hard numeric/length bounds derived from
//! deterministic aggregation over a live data store, and soft regex/format
//! patterns recognized by an external generative classifier. The fused
//! per-field rules are assembled into a per-model rule map consumed by
//! downstream code generators.
//!
//! # Architecture
//! - [`stats::StatsAnalyzer`] — type-dispatched deterministic evidence
//!   (bounded string samples, full numeric aggregates, enum enumeration).
//! - [`recognizer::PatternRecognizer`] — best-effort pattern evidence via
//!   an external classifier, bounded to 50 deduplicated samples per field.
//! - [`throttle::RateLimiter`] — a single serialized call slot enforcing
//!   the classifier's requests-per-minute budget across the run.
//! - [`infer::RuleInferencer`] — the sequential orchestrator fusing both
//!   evidence sources into [`models::ValidationRule`]s.
//!
//! # Failure model
//! Evidence-gathering failures (store or classifier) are recovered where
//! they occur, logged with model/field context, and degrade only the
//! affected evidence source for that one field. Only total data-store
//! unavailability fails a run.

pub mod classifier;
pub mod config;
pub mod error;
pub mod infer;
pub mod logging;
pub mod models;
pub mod recognizer;
pub mod stats;
pub mod store;
pub mod throttle;

// Re-export commonly used types
pub use classifier::{ClassifierClient, ClassifierError, create_classifier};
pub use config::InferenceConfig;
pub use error::{Result, RulesmithError};
pub use infer::RuleInferencer;
pub use models::{
    Field, FieldKind, FieldStats, FieldType, Model, PatternFormat, PatternInference, RuleMap,
    ValidationRule,
};
pub use store::{DataStore, create_store};
