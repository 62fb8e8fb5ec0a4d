use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use serde_json::Value;
use tracing::debug;

use crate::database::DatabasePool;
use super::{apply_patch, prepare_insert, validate_identifier, Filter, Query, Row, StoreError, TableClient};

/// Table client backed by the SQLite `records` table.
///
/// Every call runs rusqlite synchronously on the calling task and holds a
/// pooled connection until it returns. Statements are single-row or
/// single-table scans over a local file, so they stay short; callers that
/// need long scans should move them onto `tokio::task::spawn_blocking`.
#[derive(Debug, Clone)]
pub struct SqliteTableClient {
    pool: DatabasePool,
}

impl SqliteTableClient {
    /// Create a client over an existing pool
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>, StoreError> {
        match &self.pool {
            DatabasePool::SQLite(pool) => Ok(pool.get()?),
        }
    }
}

/// Convert a JSON filter value into the SQL value `json_extract` yields for it
fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Build the WHERE clause for a table plus equality filters.
///
/// Column names must already be validated; they are interpolated into the
/// JSON path while values are always bound.
fn where_clause(table: &str, filters: &[Filter]) -> (String, Vec<SqlValue>) {
    let mut clauses = vec!["table_name = ?".to_string()];
    let mut params = vec![SqlValue::Text(table.to_string())];

    for filter in filters {
        if filter.value.is_null() {
            clauses.push(format!("json_extract(data, '$.{}') IS NULL", filter.column));
        } else {
            clauses.push(format!("json_extract(data, '$.{}') = ?", filter.column));
            params.push(to_sql_value(&filter.value));
        }
    }

    (format!(" WHERE {}", clauses.join(" AND ")), params)
}

fn decode_row(data: &str) -> Result<Row, StoreError> {
    Ok(serde_json::from_str(data)?)
}

fn row_text(row: &Row, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl TableClient for SqliteTableClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        validate_identifier(table)?;
        query.validate()?;
        debug!("Selecting from {} with {} filter(s)", table, query.filters.len());

        let (where_sql, params) = where_clause(table, &query.filters);
        let mut sql = format!("SELECT data FROM records{}", where_sql);

        match &query.order_by {
            Some(order) => {
                let direction = if order.descending { "DESC" } else { "ASC" };
                sql.push_str(&format!(" ORDER BY json_extract(data, '$.{}') {}", order.column, direction));
            },
            None => sql.push_str(" ORDER BY created_at ASC, rowid ASC"),
        }

        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let conn = self.connection()?;
        let mut stmt = conn.prepare(&sql)?;
        let encoded = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| row.get::<_, String>(0))?;

        let mut rows = Vec::new();
        for data in encoded {
            rows.push(decode_row(&data?)?);
        }

        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, StoreError> {
        validate_identifier(table)?;

        let row = prepare_insert(row);
        let id = row_text(&row, "id");
        debug!("Inserting row into {}: id={}", table, id);

        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO records (table_name, id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                table,
                &id,
                serde_json::to_string(&row)?,
                row_text(&row, "created_at"),
                row_text(&row, "updated_at"),
            ),
        )?;

        Ok(row)
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Row) -> Result<Vec<Row>, StoreError> {
        validate_identifier(table)?;
        for filter in filters {
            validate_identifier(&filter.column)?;
        }
        debug!("Updating rows in {} with {} filter(s)", table, filters.len());

        let (where_sql, params) = where_clause(table, filters);
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        let mut matched = Vec::new();
        {
            let mut stmt = tx.prepare(&format!("SELECT id, data FROM records{}", where_sql))?;
            let encoded = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for entry in encoded {
                let (id, data) = entry?;
                matched.push((id, decode_row(&data)?));
            }
        }

        let mut updated = Vec::with_capacity(matched.len());
        for (id, mut row) in matched {
            apply_patch(&mut row, &patch);
            tx.execute(
                "UPDATE records SET data = ?1, updated_at = ?2 WHERE table_name = ?3 AND id = ?4",
                (
                    serde_json::to_string(&row)?,
                    row_text(&row, "updated_at"),
                    table,
                    &id,
                ),
            )?;
            updated.push(row);
        }

        tx.commit()?;
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<usize, StoreError> {
        validate_identifier(table)?;
        for filter in filters {
            validate_identifier(&filter.column)?;
        }
        debug!("Deleting rows from {} with {} filter(s)", table, filters.len());

        let (where_sql, params) = where_clause(table, filters);
        let conn = self.connection()?;
        let removed = conn.execute(
            &format!("DELETE FROM records{}", where_sql),
            rusqlite::params_from_iter(params.iter()),
        )?;

        Ok(removed)
    }
}
