use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_records_table(conn)?;
    create_records_indexes(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the generic records table.
///
/// Every feature table lives in this one physical table, keyed by
/// `(table_name, id)`, with the row body stored as a JSON document.
fn create_records_table(conn: &Connection) -> Result<(), String> {
    info!("Creating records table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS records (
            table_name TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (table_name, id)
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create indexes used by per-user listings
fn create_records_indexes(conn: &Connection) -> Result<(), String> {
    info!("Creating index on records user_id");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_records_table_user
        ON records (table_name, json_extract(data, '$.user_id'))",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_records_table_created
        ON records (table_name, created_at DESC)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'records'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
