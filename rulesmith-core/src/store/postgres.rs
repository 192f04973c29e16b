//! PostgreSQL data store backed by sqlx.
//!
//! All queries are read-only SELECTs. Value limits are bound as
//! parameters; table and column names come from the trusted schema
//! catalog and are interpolated with identifier quoting. Loosely typed
//! results are carried as `serde_json::Value` via `to_jsonb`, so the
//! analyzer never depends on engine-specific column types.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::DataStore;
use crate::error::{Result, RulesmithError, redact_database_url};

/// PostgreSQL implementation of [`DataStore`].
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

/// Quotes an identifier for interpolation into a query.
///
/// Embedded double quotes are doubled per SQL rules.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

impl PostgresStore {
    /// Connects to PostgreSQL with a small read-only pool.
    ///
    /// # Errors
    /// Returns a connection error (URL redacted) if the pool cannot be
    /// established.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(connection_string)
            .await
            .map_err(|e| {
                RulesmithError::connection_failed(
                    format!(
                        "Failed to connect to {}",
                        redact_database_url(connection_string)
                    ),
                    e,
                )
            })?;

        Ok(Self { pool })
    }

    /// Wraps an existing pool, e.g. one shared with the schema parser.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataStore for PostgresStore {
    async fn test_connection(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| RulesmithError::connection_failed("Connection test failed", e))?;
        Ok(())
    }

    async fn has_nulls(&self, table: &str, column: &str) -> Result<bool> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} IS NULL)",
            quote_ident(table),
            quote_ident(column)
        );

        let has_nulls: bool = sqlx::query_scalar(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                RulesmithError::query_failed(
                    format!("Null check failed for '{}.{}'", table, column),
                    e,
                )
            })?;

        Ok(has_nulls)
    }

    async fn sample_strings(&self, table: &str, column: &str, limit: u32) -> Result<Vec<String>> {
        let query = format!(
            "SELECT {col}::text FROM {table} WHERE {col} IS NOT NULL LIMIT $1",
            col = quote_ident(column),
            table = quote_ident(table),
        );

        tracing::debug!(table, column, limit, "sampling column values");

        sqlx::query_scalar(&query)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                RulesmithError::query_failed(
                    format!("Value sampling failed for '{}.{}'", table, column),
                    e,
                )
            })
    }

    async fn distinct_strings(
        &self,
        table: &str,
        column: &str,
        limit: u32,
    ) -> Result<Vec<String>> {
        // Ordered so repeated runs see the same sample
        let query = format!(
            "SELECT DISTINCT {col}::text AS v FROM {table} WHERE {col} IS NOT NULL ORDER BY v LIMIT $1",
            col = quote_ident(column),
            table = quote_ident(table),
        );

        sqlx::query_scalar(&query)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                RulesmithError::query_failed(
                    format!("Distinct sampling failed for '{}.{}'", table, column),
                    e,
                )
            })
    }

    async fn numeric_range(
        &self,
        table: &str,
        column: &str,
    ) -> Result<Option<(JsonValue, JsonValue)>> {
        // Single full-column aggregate; assumed efficient for indexed
        // numeric columns, so no sampling here.
        let query = format!(
            "SELECT to_jsonb(MIN({col})) AS min, to_jsonb(MAX({col})) AS max FROM {table}",
            col = quote_ident(column),
            table = quote_ident(table),
        );

        let row = sqlx::query(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                RulesmithError::query_failed(
                    format!("Min/max aggregate failed for '{}.{}'", table, column),
                    e,
                )
            })?;

        let min: Option<JsonValue> = row.try_get("min").map_err(|e| {
            RulesmithError::query_failed(format!("Failed to decode min for '{}.{}'", table, column), e)
        })?;
        let max: Option<JsonValue> = row.try_get("max").map_err(|e| {
            RulesmithError::query_failed(format!("Failed to decode max for '{}.{}'", table, column), e)
        })?;

        Ok(match (min, max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        })
    }

    async fn distinct_values(&self, table: &str, column: &str) -> Result<Vec<JsonValue>> {
        let query = format!(
            "SELECT DISTINCT to_jsonb({col}) AS v FROM {table} WHERE {col} IS NOT NULL ORDER BY v",
            col = quote_ident(column),
            table = quote_ident(table),
        );

        sqlx::query_scalar(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                RulesmithError::query_failed(
                    format!("Distinct enumeration failed for '{}.{}'", table, column),
                    e,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_plain() {
        assert_eq!(quote_ident("users"), "\"users\"");
        assert_eq!(quote_ident("User"), "\"User\"");
    }

    #[test]
    fn test_quote_ident_embedded_quote() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
