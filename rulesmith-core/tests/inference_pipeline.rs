//! End-to-end pipeline tests over in-memory store and classifier mocks.
//!
//! These exercise the full aggregation loop: dispatch per field kind,
//! evidence merging, partial-failure degradation, deterministic output,
//! and classifier rate limiting under a paused clock.

use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rulesmith_core::classifier::{ClassifierClient, ClassifierError, ClassifierResult};
use rulesmith_core::error::{Result, RulesmithError};
use rulesmith_core::{
    DataStore, Field, FieldKind, FieldType, InferenceConfig, Model, RuleInferencer,
};

/// Canned per-column data for the mock store.
#[derive(Default, Clone)]
struct ColumnData {
    strings: Vec<String>,
    range: Option<(JsonValue, JsonValue)>,
    distinct: Vec<JsonValue>,
    has_nulls: bool,
}

/// In-memory data store keyed by (table, column).
#[derive(Default)]
struct MockStore {
    columns: HashMap<(String, String), ColumnData>,
    unreachable: bool,
}

impl MockStore {
    fn new() -> Self {
        Self::default()
    }

    fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    fn with_column(mut self, table: &str, column: &str, data: ColumnData) -> Self {
        self.columns
            .insert((table.to_string(), column.to_string()), data);
        self
    }

    fn column(&self, table: &str, column: &str) -> ColumnData {
        self.columns
            .get(&(table.to_string(), column.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DataStore for MockStore {
    async fn test_connection(&self) -> Result<()> {
        if self.unreachable {
            return Err(RulesmithError::connection_failed(
                "mock store down",
                std::io::Error::other("connection refused"),
            ));
        }
        Ok(())
    }

    async fn has_nulls(&self, table: &str, column: &str) -> Result<bool> {
        Ok(self.column(table, column).has_nulls)
    }

    async fn sample_strings(&self, table: &str, column: &str, limit: u32) -> Result<Vec<String>> {
        Ok(self
            .column(table, column)
            .strings
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn distinct_strings(&self, table: &str, column: &str, limit: u32) -> Result<Vec<String>> {
        let mut seen = std::collections::HashSet::new();
        Ok(self
            .column(table, column)
            .strings
            .into_iter()
            .filter(|v| seen.insert(v.clone()))
            .take(limit as usize)
            .collect())
    }

    async fn numeric_range(
        &self,
        table: &str,
        column: &str,
    ) -> Result<Option<(JsonValue, JsonValue)>> {
        Ok(self.column(table, column).range)
    }

    async fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<JsonValue>> {
        Ok(self.column(table, column).distinct)
    }
}

/// Classifier mock answering from a field-name lookup table.
struct MockClassifier {
    responses: HashMap<String, String>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl MockClassifier {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    fn with_response(mut self, field: &str, raw: &str) -> Self {
        self.responses.insert(field.to_string(), raw.to_string());
        self
    }

    /// Shared call counter, usable after the mock moves into the run.
    fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ClassifierClient for MockClassifier {
    async fn complete(&self, _system: &str, prompt: &str) -> ClassifierResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClassifierError::Connection("mock outage".to_string()));
        }

        let message: JsonValue =
            serde_json::from_str(prompt).map_err(|e| ClassifierError::Parse(e.to_string()))?;
        let field = message["field"].as_str().unwrap_or_default();
        match self.responses.get(field) {
            Some(raw) => Ok(raw.clone()),
            None => Ok(r#"{"pattern": null, "description": "no pattern"}"#.to_string()),
        }
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

const EMAIL_RESPONSE: &str = r#"{"pattern": "^[^@]+@[^@]+\\.[^@]+$", "format": "email", "description": "email addresses"}"#;

fn user_catalog() -> Vec<Model> {
    vec![Model::new(
        "User",
        vec![
            Field::new("id", FieldType::Int, FieldKind::Scalar),
            Field::new("email", FieldType::String, FieldKind::Scalar),
        ],
    )]
}

fn user_store() -> MockStore {
    MockStore::new()
        .with_column(
            "User",
            "id",
            ColumnData {
                range: Some((json!(1), json!(500))),
                ..Default::default()
            },
        )
        .with_column(
            "User",
            "email",
            ColumnData {
                strings: vec!["a@example.com".to_string(), "bob@example.org".to_string()],
                ..Default::default()
            },
        )
}

fn inferencer(store: MockStore, classifier: MockClassifier) -> RuleInferencer {
    RuleInferencer::new(
        Box::new(store),
        Box::new(classifier),
        InferenceConfig::new().with_requests_per_minute(600),
    )
}

// Scenario A: numeric bounds from the store, pattern from the classifier.
#[tokio::test]
async fn scenario_a_numeric_and_pattern_evidence() {
    let classifier = MockClassifier::new().with_response("email", EMAIL_RESPONSE);
    let rules = inferencer(user_store(), classifier)
        .infer_rules(&user_catalog())
        .await
        .unwrap();

    let user_rules = &rules["User"];
    assert_eq!(user_rules.len(), 2);

    let id_rule = &user_rules[0];
    assert_eq!(id_rule.field, "id");
    assert_eq!(id_rule.min, Some(json!(1)));
    assert_eq!(id_rule.max, Some(json!(500)));
    assert!(id_rule.pattern.is_none());
    assert!(!id_rule.nullable);

    let email_rule = &user_rules[1];
    assert_eq!(email_rule.field, "email");
    assert_eq!(email_rule.pattern.as_deref(), Some("^[^@]+@[^@]+\\.[^@]+$"));
    // length bounds from the statistical sample share the min/max slots
    assert_eq!(email_rule.min, Some(json!(13)));
    assert_eq!(email_rule.max, Some(json!(15)));
}

// Scenario B: classifier outage leaves statistical evidence intact.
#[tokio::test]
async fn scenario_b_classifier_failure_keeps_length_bounds() {
    let rules = inferencer(user_store(), MockClassifier::failing())
        .infer_rules(&user_catalog())
        .await
        .unwrap();

    let email_rule = rules["User"]
        .iter()
        .find(|r| r.field == "email")
        .expect("email rule present");
    assert!(email_rule.pattern.is_none());
    assert_eq!(email_rule.min, Some(json!(13)));
    assert_eq!(email_rule.max, Some(json!(15)));
}

// Scenario B, second half: no stats either means the field is dropped.
#[tokio::test]
async fn scenario_b_no_evidence_drops_field() {
    // Empty email column: no length stats, nothing to classify
    let store = MockStore::new().with_column(
        "User",
        "id",
        ColumnData {
            range: Some((json!(1), json!(500))),
            ..Default::default()
        },
    );
    let rules = inferencer(store, MockClassifier::failing())
        .infer_rules(&user_catalog())
        .await
        .unwrap();

    let user_rules = &rules["User"];
    assert_eq!(user_rules.len(), 1);
    assert_eq!(user_rules[0].field, "id");
}

// Scenario C: a relations-only model is absent from the output map.
#[tokio::test]
async fn scenario_c_relation_only_model_absent() {
    let models = vec![
        Model::new(
            "Membership",
            vec![
                Field::new(
                    "user",
                    FieldType::Relation {
                        target: "User".into(),
                    },
                    FieldKind::Relation,
                ),
                Field::new(
                    "team",
                    FieldType::Relation {
                        target: "Team".into(),
                    },
                    FieldKind::Relation,
                ),
            ],
        ),
        Model::new(
            "Team",
            vec![Field::new("id", FieldType::Int, FieldKind::Scalar)],
        ),
    ];

    let store = MockStore::new().with_column(
        "Team",
        "id",
        ColumnData {
            range: Some((json!(1), json!(3))),
            ..Default::default()
        },
    );

    let rules = inferencer(store, MockClassifier::new())
        .infer_rules(&models)
        .await
        .unwrap();

    assert!(!rules.contains_key("Membership"));
    assert!(rules.contains_key("Team"));
}

#[tokio::test]
async fn relation_fields_never_emit_rules() {
    let models = vec![Model::new(
        "Post",
        vec![
            Field::new("id", FieldType::Int, FieldKind::Scalar),
            Field::new(
                "author",
                FieldType::Relation {
                    target: "User".into(),
                },
                FieldKind::Relation,
            ),
        ],
    )];

    let store = MockStore::new().with_column(
        "Post",
        "id",
        ColumnData {
            range: Some((json!(1), json!(9))),
            ..Default::default()
        },
    );

    let rules = inferencer(store, MockClassifier::new())
        .infer_rules(&models)
        .await
        .unwrap();

    assert!(rules["Post"].iter().all(|r| r.field != "author"));
}

#[tokio::test]
async fn enum_fields_contribute_examples_without_bounds() {
    // An enum domain alone carries no min/max/pattern, so no rule emerges
    let models = vec![Model::new(
        "User",
        vec![Field::new(
            "role",
            FieldType::Enum {
                name: "Role".into(),
            },
            FieldKind::Enum,
        )],
    )];
    let store = MockStore::new().with_column(
        "User",
        "role",
        ColumnData {
            distinct: vec![json!("ADMIN"), json!("USER")],
            ..Default::default()
        },
    );

    let rules = inferencer(store, MockClassifier::new())
        .infer_rules(&models)
        .await
        .unwrap();
    assert!(rules.is_empty());
}

#[tokio::test]
async fn unreachable_store_fails_the_run() {
    let result = inferencer(MockStore::unreachable(), MockClassifier::new())
        .infer_rules(&user_catalog())
        .await;

    assert!(matches!(result, Err(RulesmithError::Connection { .. })));
}

#[tokio::test]
async fn physical_storage_names_are_used_for_queries() {
    let models = vec![
        Model::new(
            "User",
            vec![
                Field::new("id", FieldType::Int, FieldKind::Scalar)
                    .with_storage_name("user_id"),
            ],
        )
        .with_storage_name("users"),
    ];

    // Data lives under the physical names only
    let store = MockStore::new().with_column(
        "users",
        "user_id",
        ColumnData {
            range: Some((json!(7), json!(11))),
            ..Default::default()
        },
    );

    let rules = inferencer(store, MockClassifier::new())
        .infer_rules(&models)
        .await
        .unwrap();

    // The rule is keyed by logical names
    assert_eq!(rules["User"][0].field, "id");
    assert_eq!(rules["User"][0].min, Some(json!(7)));
}

#[tokio::test]
async fn idempotent_under_fixed_evidence() {
    let run = |store: MockStore, classifier: MockClassifier| async move {
        inferencer(store, classifier)
            .infer_rules(&user_catalog())
            .await
            .unwrap()
    };

    let first = run(
        user_store(),
        MockClassifier::new().with_response("email", EMAIL_RESPONSE),
    )
    .await;
    let second = run(
        user_store(),
        MockClassifier::new().with_response("email", EMAIL_RESPONSE),
    )
    .await;

    let first_json = serde_json::to_string(&first).unwrap();
    let second_json = serde_json::to_string(&second).unwrap();
    assert_eq!(first_json, second_json);
}

// Rate limiting: N eligible fields take at least (N-1) * (60000/RPM) ms.
#[tokio::test(start_paused = true)]
async fn classifier_calls_are_rate_limited() {
    let fields: Vec<Field> = (0..3)
        .map(|i| Field::new(format!("s{i}"), FieldType::String, FieldKind::Scalar))
        .collect();
    let models = vec![Model::new("Doc", fields)];

    let mut store = MockStore::new();
    for i in 0..3 {
        store = store.with_column(
            "Doc",
            &format!("s{i}"),
            ColumnData {
                strings: vec![format!("value-{i}")],
                ..Default::default()
            },
        );
    }

    let classifier = MockClassifier::new();
    let inferencer = RuleInferencer::new(
        Box::new(store),
        Box::new(classifier),
        InferenceConfig::new().with_requests_per_minute(60),
    );

    let start = tokio::time::Instant::now();
    let _ = inferencer.infer_rules(&models).await.unwrap();

    // 3 classifier calls at 60 RPM: two enforced 1s gaps
    assert!(start.elapsed() >= std::time::Duration::from_millis(2_000));
}

#[tokio::test]
async fn empty_columns_do_not_reach_the_classifier() {
    let models = vec![Model::new(
        "User",
        vec![Field::new("nickname", FieldType::String, FieldKind::Scalar)],
    )];

    let classifier = MockClassifier::new();
    let calls = classifier.call_counter();

    let store = MockStore::new(); // nickname column has no data
    let inferencer = RuleInferencer::new(
        Box::new(store),
        Box::new(classifier),
        InferenceConfig::new().with_requests_per_minute(600),
    );

    let rules = inferencer.infer_rules(&models).await.unwrap();
    assert!(rules.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
