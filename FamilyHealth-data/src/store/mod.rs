//! Generic table query client.
//!
//! Every feature module persists its records through [`TableClient`], a
//! table-oriented interface with equality filters: select, insert, update
//! and delete. Rows are untyped JSON objects; typing happens in the
//! repository layer.

mod in_memory;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::database::{get_db_pool, DatabaseError};

pub use in_memory::InMemoryTableClient;
pub use sqlite::SqliteTableClient;

/// A single table row
pub type Row = Map<String, Value>;

/// Errors raised by a table client
#[derive(Error, Debug)]
pub enum StoreError {
    /// Table or column name is not a plain identifier
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Row body could not be encoded or decoded
    #[error("Row serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Database configuration or availability error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Lock poisoned
    #[error("Lock error: {0}")]
    Lock(String),
}

/// Equality filter on one column
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Column name
    pub column: String,
    /// Value the column must equal; `Null` matches absent columns too
    pub value: Value,
}

impl Filter {
    /// Create an equality filter
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether a row satisfies this filter
    pub fn matches(&self, row: &Row) -> bool {
        match row.get(&self.column) {
            Some(value) => values_equal(value, &self.value),
            None => self.value.is_null(),
        }
    }
}

/// Numbers compare by value so that `1` and `1.0` are equal
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering applied to a select
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// Column to order by
    pub column: String,
    /// Descending order when true
    pub descending: bool,
}

/// Select query: equality filters, optional ordering and limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Filters combined with AND
    pub filters: Vec<Filter>,
    /// Optional ordering
    pub order_by: Option<OrderBy>,
    /// Maximum number of rows returned
    pub limit: Option<usize>,
}

impl Query {
    /// Create an empty query matching every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    /// Order results by a column
    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some(OrderBy {
            column: column.into(),
            descending,
        });
        self
    }

    /// Cap the number of rows returned
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a row satisfies every filter
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Check that every column referenced is a plain identifier
    pub fn validate(&self) -> Result<(), StoreError> {
        for filter in &self.filters {
            validate_identifier(&filter.column)?;
        }
        if let Some(order) = &self.order_by {
            validate_identifier(&order.column)?;
        }
        Ok(())
    }
}

/// Table-based query client shared by every feature module
#[async_trait]
pub trait TableClient: Send + Sync + std::fmt::Debug {
    /// Select the rows of a table matching a query
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Insert a row, assigning `id`, `created_at` and `updated_at` when absent
    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError>;

    /// Merge `patch` into every row matching the filters and return the updated rows
    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>, StoreError>;

    /// Delete every row matching the filters and return how many were removed
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<usize, StoreError>;
}

/// Check that a table or column name is a plain identifier
pub fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        },
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Fill in `id` and timestamps on a row about to be inserted
pub(crate) fn prepare_insert(mut row: Row) -> Row {
    let now = Value::String(Utc::now().to_rfc3339());

    let has_id = matches!(row.get("id"), Some(Value::String(id)) if !id.is_empty());
    if !has_id {
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    if !matches!(row.get("created_at"), Some(Value::String(_))) {
        row.insert("created_at".to_string(), now.clone());
    }
    if !matches!(row.get("updated_at"), Some(Value::String(_))) {
        row.insert("updated_at".to_string(), now);
    }
    row
}

/// Merge a patch into a row; `id` and `created_at` are never overwritten
pub(crate) fn apply_patch(row: &mut Row, patch: &Row) {
    for (key, value) in patch {
        if key == "id" || key == "created_at" {
            continue;
        }
        row.insert(key.clone(), value.clone());
    }
    row.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
}

/// Compare two rows on a column for ordering; absent values sort first
pub(crate) fn compare_on(a: &Row, b: &Row, column: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    match (a.get(column), b.get(column)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

/// Process-wide in-memory client used when no database pool is available
static FALLBACK_CLIENT: Lazy<Arc<InMemoryTableClient>> =
    Lazy::new(|| Arc::new(InMemoryTableClient::new()));

/// Pick the table client for this process.
///
/// Uses SQLite when the global pool has been initialised, otherwise a shared
/// in-memory client so the application keeps working without a database.
pub fn default_table_client() -> Arc<dyn TableClient> {
    match get_db_pool() {
        Ok(pool) => {
            debug!("Using SQLite table client");
            Arc::new(SqliteTableClient::new(pool))
        },
        Err(e) => {
            debug!("Database not available ({}), using in-memory table client", e);
            FALLBACK_CLIENT.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("user_id").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("table2").is_ok());
        assert!(validate_identifier("2table").is_err());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("name'); DROP TABLE records; --").is_err());
        assert!(validate_identifier("a.b").is_err());
    }

    #[test]
    fn test_filter_matches() {
        let r = row(json!({ "user_id": "u1", "count": 3, "active": true, "note": null }));

        assert!(Filter::eq("user_id", "u1").matches(&r));
        assert!(!Filter::eq("user_id", "u2").matches(&r));
        assert!(Filter::eq("count", 3.0).matches(&r));
        assert!(Filter::eq("active", true).matches(&r));
        assert!(Filter::eq("note", Value::Null).matches(&r));
        assert!(Filter::eq("missing", Value::Null).matches(&r));
        assert!(!Filter::eq("missing", "x").matches(&r));
    }

    #[test]
    fn test_prepare_insert_keeps_existing_id() {
        let prepared = prepare_insert(row(json!({ "id": "abc" })));
        assert_eq!(prepared["id"], json!("abc"));
        assert!(prepared.contains_key("created_at"));
        assert!(prepared.contains_key("updated_at"));

        let generated = prepare_insert(Row::new());
        let id = generated["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[test]
    fn test_apply_patch_protects_identity() {
        let mut r = row(json!({ "id": "abc", "created_at": "2024-01-01T00:00:00Z", "name": "old" }));
        apply_patch(&mut r, &row(json!({ "id": "zzz", "created_at": "x", "name": "new" })));

        assert_eq!(r["id"], json!("abc"));
        assert_eq!(r["created_at"], json!("2024-01-01T00:00:00Z"));
        assert_eq!(r["name"], json!("new"));
    }

    #[test]
    fn test_query_validate_rejects_bad_columns() {
        assert!(Query::new().eq("user_id", "u1").order_by("created_at", true).validate().is_ok());
        assert!(Query::new().eq("user id", "u1").validate().is_err());
        assert!(Query::new().order_by("x;y", false).validate().is_err());
    }
}
