//! Statistical analyzer: deterministic, data-store-derived evidence.
//!
//! Each field is dispatched to a type-specific strategy:
//!
//! - **String** — a bounded sample of non-null values; length bounds are
//!   computed in memory over the sample. Exact bounds would need a full
//!   scan, so the cap trades exactness for bounded cost.
//! - **Numeric family** — a single min/max aggregate over the full
//!   column; no sampling, since aggregates over indexed columns are
//!   assumed cheap.
//! - **Enum kind** — full distinct-value enumeration; the domain is
//!   known to be small.
//! - **Boolean/DateTime/Json/relation/list** — no statistics attempted.
//!
//! The analyzer never raises: any store error is logged as a warning with
//! model and field context, and whatever was already gathered is
//! returned.

use crate::config::STRING_STATS_SAMPLE_CAP;
use crate::models::{Field, FieldKind, FieldStats, FieldType, Model};
use crate::store::DataStore;

/// Analyzer over a live data store.
pub struct StatsAnalyzer<'a> {
    store: &'a dyn DataStore,
}

impl<'a> StatsAnalyzer<'a> {
    /// Creates an analyzer borrowing the run's data store.
    pub fn new(store: &'a dyn DataStore) -> Self {
        Self { store }
    }

    /// Gathers statistics for one field.
    ///
    /// Never fails; partial evidence is returned when individual queries
    /// error out.
    pub async fn analyze(&self, model: &Model, field: &Field) -> FieldStats {
        let mut stats = FieldStats::default();
        let table = model.table_name();
        let column = field.column_name();

        if field.kind == FieldKind::Relation {
            return stats;
        }

        if !field.is_list {
            match field.kind {
                FieldKind::Enum => self.collect_enum_domain(&mut stats, model, field).await,
                FieldKind::Scalar => match field.field_type {
                    FieldType::String => {
                        self.collect_string_lengths(&mut stats, model, field).await;
                    }
                    FieldType::Int
                    | FieldType::Float
                    | FieldType::Decimal
                    | FieldType::BigInt => {
                        self.collect_numeric_range(&mut stats, model, field).await;
                    }
                    FieldType::Boolean
                    | FieldType::DateTime
                    | FieldType::Json
                    | FieldType::Enum { .. }
                    | FieldType::Relation { .. } => {}
                },
                FieldKind::Relation => {}
            }
        }

        if !field.is_required {
            match self.store.has_nulls(table, column).await {
                Ok(has_nulls) => stats.has_nulls = Some(has_nulls),
                Err(e) => {
                    tracing::warn!(
                        model = %model.name,
                        field = %field.name,
                        error = %e,
                        "null check failed"
                    );
                }
            }
        }

        stats
    }

    async fn collect_string_lengths(&self, stats: &mut FieldStats, model: &Model, field: &Field) {
        let sample = match self
            .store
            .sample_strings(model.table_name(), field.column_name(), STRING_STATS_SAMPLE_CAP)
            .await
        {
            Ok(sample) => sample,
            Err(e) => {
                tracing::warn!(
                    model = %model.name,
                    field = %field.name,
                    error = %e,
                    "string sampling failed"
                );
                return;
            }
        };

        if sample.is_empty() {
            return;
        }

        let lengths = sample.iter().map(|v| v.chars().count() as u32);
        stats.min_length = lengths.clone().min();
        stats.max_length = lengths.max();
    }

    async fn collect_numeric_range(&self, stats: &mut FieldStats, model: &Model, field: &Field) {
        match self
            .store
            .numeric_range(model.table_name(), field.column_name())
            .await
        {
            Ok(Some((min, max))) => {
                stats.min = Some(min);
                stats.max = Some(max);
            }
            Ok(None) => {
                tracing::debug!(
                    model = %model.name,
                    field = %field.name,
                    "column empty or all-null, no range"
                );
            }
            Err(e) => {
                tracing::warn!(
                    model = %model.name,
                    field = %field.name,
                    error = %e,
                    "min/max aggregate failed"
                );
            }
        }
    }

    async fn collect_enum_domain(&self, stats: &mut FieldStats, model: &Model, field: &Field) {
        match self
            .store
            .distinct_values(model.table_name(), field.column_name())
            .await
        {
            Ok(values) => {
                stats.distinct_count = Some(values.len() as u64);
                stats.distinct_values = Some(values);
            }
            Err(e) => {
                tracing::warn!(
                    model = %model.name,
                    field = %field.name,
                    error = %e,
                    "distinct enumeration failed"
                );
            }
        }
    }
}
