//! Core data models for the rule inference pipeline.
//!
//! This module defines the schema catalog types consumed from the external
//! schema parser, the per-field evidence types produced by the statistical
//! analyzer and the pattern recognizer, and the `ValidationRule` output
//! handed to downstream code generators. All models are serializable and
//! created fresh for each inference run.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Closed classification of declared field types.
///
/// Every field in the catalog resolves to exactly one of these tags before
/// any statistics are computed, so dispatch in the analyzer is exhaustive
/// and never falls through silently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Text types
    String,
    /// 32-bit integer types
    Int,
    /// Floating point types
    Float,
    /// Arbitrary-precision decimal types
    Decimal,
    /// 64-bit integer types
    BigInt,
    /// Boolean type
    Boolean,
    /// Date and time types
    DateTime,
    /// JSON/JSONB data
    Json,
    /// Named enum type with a small closed domain
    Enum { name: String },
    /// Relation/object marker pointing at another model
    Relation { target: String },
}

impl FieldType {
    /// Returns true for the numeric family (Int/Float/Decimal/BigInt).
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Int | FieldType::Float | FieldType::Decimal | FieldType::BigInt
        )
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "String"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Decimal => write!(f, "Decimal"),
            FieldType::BigInt => write!(f, "BigInt"),
            FieldType::Boolean => write!(f, "Boolean"),
            FieldType::DateTime => write!(f, "DateTime"),
            FieldType::Json => write!(f, "Json"),
            FieldType::Enum { name } => write!(f, "{}", name),
            FieldType::Relation { target } => write!(f, "{}", target),
        }
    }
}

/// Kind of a field: scalar value, enum-valued, or relation to another model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Primitive value (string/number/boolean/date/etc.)
    Scalar,
    /// Value drawn from a named enum domain
    Enum,
    /// Reference to another model; never produces a rule
    Relation,
}

/// A named, typed attribute of a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Logical field name as declared in the schema
    pub name: String,
    /// Physical column name in the data store, when it differs
    pub storage_name: Option<String>,
    /// Declared type tag
    pub field_type: FieldType,
    /// Scalar, enum, or relation
    pub kind: FieldKind,
    /// Whether the schema declares the field as required (non-nullable)
    pub is_required: bool,
    /// Whether the field holds a list of values
    pub is_list: bool,
    /// Whether the schema declares a uniqueness constraint on the field
    pub is_unique: bool,
}

impl Field {
    /// Creates a required scalar field with the given type.
    pub fn new(name: impl Into<String>, field_type: FieldType, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            storage_name: None,
            field_type,
            kind,
            is_required: true,
            is_list: false,
            is_unique: false,
        }
    }

    /// Builder method to mark the field optional.
    pub fn optional(mut self) -> Self {
        self.is_required = false;
        self
    }

    /// Builder method to mark the field as a list.
    pub fn list(mut self) -> Self {
        self.is_list = true;
        self
    }

    /// Builder method to mark the field unique.
    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Builder method to set the physical column name.
    pub fn with_storage_name(mut self, name: impl Into<String>) -> Self {
        self.storage_name = Some(name.into());
        self
    }

    /// Physical column name used for data-store queries.
    pub fn column_name(&self) -> &str {
        self.storage_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether this field is eligible for classifier-based pattern
    /// inference: a scalar, non-list String field.
    pub fn is_classifier_eligible(&self) -> bool {
        self.kind == FieldKind::Scalar
            && !self.is_list
            && self.field_type == FieldType::String
    }
}

/// A named entity in the source schema, corresponding to one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Logical model name
    pub name: String,
    /// Physical table name in the data store, when it differs
    pub storage_name: Option<String>,
    /// Ordered field list as declared in the schema
    pub fields: Vec<Field>,
}

impl Model {
    /// Creates a model with the given fields.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            storage_name: None,
            fields,
        }
    }

    /// Builder method to set the physical table name.
    pub fn with_storage_name(mut self, name: impl Into<String>) -> Self {
        self.storage_name = Some(name.into());
        self
    }

    /// Physical table name used for data-store queries.
    pub fn table_name(&self) -> &str {
        self.storage_name.as_deref().unwrap_or(&self.name)
    }
}

/// Deterministic, data-store-derived evidence for one field.
///
/// Every member is optional: absence means "not computed for this type",
/// not "computed as empty".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldStats {
    /// Minimum value observed via a full aggregate (numeric fields only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<JsonValue>,
    /// Maximum value observed via a full aggregate (numeric fields only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<JsonValue>,
    /// Shortest string length in the bounded sample (String fields only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    /// Longest string length in the bounded sample (String fields only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Cardinality of the distinct non-null domain (enum fields only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct_count: Option<u64>,
    /// The distinct non-null domain itself (enum fields only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct_values: Option<Vec<JsonValue>>,
    /// Whether any nulls were observed (optional fields only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_nulls: Option<bool>,
}

impl FieldStats {
    /// True when no statistic was gathered at all.
    pub fn is_empty(&self) -> bool {
        self.min.is_none()
            && self.max.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.distinct_count.is_none()
            && self.distinct_values.is_none()
            && self.has_nulls.is_none()
    }
}

/// Closed set of well-known value formats the classifier may recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternFormat {
    Email,
    Uuid,
    Cuid,
    Url,
    Ipv4,
    Ipv6,
    Date,
    Datetime,
    Phone,
    Hex,
}

/// Probabilistic, classifier-derived evidence for one String field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternInference {
    /// Regex matching the sampled values, or null when none was found
    pub pattern: Option<String>,
    /// Well-known format, when the values match one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub format: Option<PatternFormat>,
    /// Short human-readable explanation from the classifier
    pub description: String,
}

/// The inferred validation contract for one field.
///
/// A rule is only ever materialized into output if at least one of
/// `min`, `max`, or `pattern` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Logical field name
    pub field: String,
    /// Declared type tag, needed by consumers to disambiguate whether
    /// `min`/`max` constrain the value or the string length
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Lower bound: numeric value for numeric fields, length for strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<JsonValue>,
    /// Upper bound: numeric value for numeric fields, length for strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<JsonValue>,
    /// Classifier-sourced regex the values are expected to match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Whether the schema permits null values
    pub nullable: bool,
    /// Whether the schema declares the field unique
    pub unique: bool,
    /// Example values drawn from gathered evidence
    pub examples: Vec<JsonValue>,
}

/// Final output of a run: model name to its non-empty rule list.
///
/// A `BTreeMap` keeps serialization order deterministic, so two runs over
/// identical evidence produce byte-identical output.
pub type RuleMap = BTreeMap<String, Vec<ValidationRule>>;
