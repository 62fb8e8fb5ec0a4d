use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::{apply_patch, compare_on, prepare_insert, validate_identifier, Filter, Query, Row, StoreError, TableClient};

/// In-memory table client, used when no database is available and in tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableClient {
    /// Rows per table, in insertion order
    tables: Arc<RwLock<HashMap<String, Vec<Row>>>>,
}

impl InMemoryTableClient {
    /// Create an empty in-memory client
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored in a table
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(table).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Lock(e.to_string())
}

#[async_trait]
impl TableClient for InMemoryTableClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        validate_identifier(table)?;
        query.validate()?;

        let tables = self.tables.read().map_err(lock_error)?;
        let mut rows: Vec<Row> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = &query.order_by {
            rows.sort_by(|a, b| {
                let cmp = compare_on(a, b, &order.column);
                if order.descending { cmp.reverse() } else { cmp }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        validate_identifier(table)?;

        let row = prepare_insert(row);
        let mut tables = self.tables.write().map_err(lock_error)?;
        let rows = tables.entry(table.to_string()).or_default();

        // Same id replaces the stored row, matching upsert semantics of the SQLite client
        let id = row.get("id").cloned();
        rows.retain(|existing| existing.get("id") != id.as_ref());
        rows.push(row.clone());

        Ok(row)
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>, StoreError> {
        validate_identifier(table)?;
        for filter in filters {
            validate_identifier(&filter.column)?;
        }

        let mut tables = self.tables.write().map_err(lock_error)?;
        let mut updated = Vec::new();

        if let Some(rows) = tables.get_mut(table) {
            for row in rows.iter_mut() {
                if filters.iter().all(|f| f.matches(row)) {
                    apply_patch(row, &patch);
                    updated.push(row.clone());
                }
            }
        }

        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<usize, StoreError> {
        validate_identifier(table)?;
        for filter in filters {
            validate_identifier(&filter.column)?;
        }

        let mut tables = self.tables.write().map_err(lock_error)?;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };

        let before = rows.len();
        rows.retain(|row| !filters.iter().all(|f| f.matches(row)));
        Ok(before - rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_select() {
        let client = InMemoryTableClient::new();
        client.insert("vital_logs", row(json!({ "user_id": "u1", "value": 70 }))).await.unwrap();
        client.insert("vital_logs", row(json!({ "user_id": "u2", "value": 80 }))).await.unwrap();

        let rows = client.select("vital_logs", &Query::new().eq("user_id", "u1")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["value"], json!(70));
        assert_eq!(client.row_count("vital_logs"), 2);
    }

    #[tokio::test]
    async fn test_select_orders_and_limits() {
        let client = InMemoryTableClient::new();
        for value in [3, 1, 2] {
            client.insert("t", row(json!({ "value": value }))).await.unwrap();
        }

        let rows = client
            .select("t", &Query::new().order_by("value", true).limit(2))
            .await
            .unwrap();
        let values: Vec<i64> = rows.iter().map(|r| r["value"].as_i64().unwrap()).collect();
        assert_eq!(values, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let client = InMemoryTableClient::new();
        let inserted = client.insert("t", row(json!({ "name": "a", "keep": 1 }))).await.unwrap();
        let id = inserted["id"].clone();

        let updated = client
            .update("t", &[Filter::eq("id", id.clone())], row(json!({ "name": "b" })))
            .await
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["name"], json!("b"));
        assert_eq!(updated[0]["keep"], json!(1));
        assert_eq!(updated[0]["id"], id);
    }

    #[tokio::test]
    async fn test_delete_counts_rows() {
        let client = InMemoryTableClient::new();
        client.insert("t", row(json!({ "user_id": "u1" }))).await.unwrap();
        client.insert("t", row(json!({ "user_id": "u1" }))).await.unwrap();
        client.insert("t", row(json!({ "user_id": "u2" }))).await.unwrap();

        let removed = client.delete("t", &[Filter::eq("user_id", "u1")]).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(client.row_count("t"), 1);
        assert_eq!(client.delete("missing", &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_table_name_rejected() {
        let client = InMemoryTableClient::new();
        let result = client.select("bad name", &Query::new()).await;
        assert!(matches!(result, Err(StoreError::InvalidIdentifier(_))));
    }
}
