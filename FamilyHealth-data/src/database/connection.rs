//! SQLite pool set-up for the FamilyHealth application.
//!
//! One pool per process lives in a global cell. Every feature table is stored
//! in the generic `records` table created by the migrations, so the pool is
//! the only database handle the rest of the crate needs.

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;

/// Default location of the database file
pub const DEFAULT_SQLITE_PATH: &str = "data/family_health.db";

static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Supported database backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    Sqlite,
}

impl FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Shared connection pool
#[derive(Debug, Clone)]
pub enum DatabasePool {
    SQLite(Arc<r2d2::Pool<SqliteConnectionManager>>),
}

/// Database set-up errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    #[error("SQLite connection pool error: {0}")]
    SqlitePoolError(#[from] r2d2::Error),

    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),

    #[error("Database directory error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pool settings, usually read from the environment
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub db_type: DatabaseType,
    /// Database file; `None` selects a private in-memory database
    pub sqlite_path: Option<String>,
    /// Idle connections kept open
    pub pool_size: u32,
    pub max_connections: u32,
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some(DEFAULT_SQLITE_PATH.to_string()),
            pool_size: 5,
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

/// Parse an environment variable, keeping the default when unset or malformed
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid value for {}: {}", name, raw);
            default
        }),
        Err(_) => default,
    }
}

impl DatabaseConfig {
    /// Read `DB_TYPE`, `DB_SQLITE_PATH`, `DB_POOL_SIZE`,
    /// `DB_MAX_CONNECTIONS` and `DB_TIMEOUT_SECONDS`
    pub fn from_env() -> Result<Self, DatabaseError> {
        let db_type = env::var("DB_TYPE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .parse::<DatabaseType>()?;

        let sqlite_path = env::var("DB_SQLITE_PATH").unwrap_or_else(|_| {
            info!("No DB_SQLITE_PATH provided, using {}", DEFAULT_SQLITE_PATH);
            DEFAULT_SQLITE_PATH.to_string()
        });

        let config = DatabaseConfig {
            db_type,
            sqlite_path: Some(sqlite_path),
            pool_size: env_or("DB_POOL_SIZE", 10),
            max_connections: env_or("DB_MAX_CONNECTIONS", 20),
            timeout_seconds: env_or("DB_TIMEOUT_SECONDS", 30),
        };

        info!(
            "Database configuration: pool_size={}, max_connections={}, timeout={}s",
            config.pool_size, config.max_connections, config.timeout_seconds
        );
        Ok(config)
    }

    /// Configuration for a private in-memory database
    pub fn in_memory() -> Self {
        Self {
            sqlite_path: None,
            ..Self::default()
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Create the global pool from the environment; fails if it already exists
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let pool = create_database_pool(&DatabaseConfig::from_env()?)?;
    DB_POOL.set(pool).map_err(|_| DatabaseError::PoolAlreadyInitialized)
}

/// The global pool, if it has been initialized
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get()
        .cloned()
        .ok_or(DatabaseError::PoolNotInitialized)
}

/// Open a pool for `config` and migrate it, without touching the global pool.
///
/// A file database that cannot be opened is replaced by an in-memory one.
pub fn create_database_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let pool = match (config.db_type, config.sqlite_path.as_deref()) {
        (DatabaseType::Sqlite, Some(path)) => open_file_pool(path, config).or_else(|e| {
            error!("Could not open SQLite database at {}: {}", path, e);
            warn!("Falling back to in-memory SQLite database");
            open_memory_pool(config)
        })?,
        (DatabaseType::Sqlite, None) => open_memory_pool(config)?,
    };

    let DatabasePool::SQLite(inner) = &pool;
    let conn = inner.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;
    info!("Database migrations completed");

    Ok(pool)
}

fn open_file_pool(path: &str, config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Opening SQLite database at {}", path);

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);
    let pool = r2d2::Pool::builder()
        .max_size(config.max_connections.max(1))
        .min_idle(Some(config.pool_size.min(config.max_connections)))
        .connection_timeout(config.timeout())
        .build(manager)?;

    // Fail here rather than on the first request
    pool.get()?;
    Ok(DatabasePool::SQLite(Arc::new(pool)))
}

/// Every SQLite memory connection is its own database, so the pool holds one
/// connection and never retires it
fn open_memory_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Opening in-memory SQLite database");

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .max_lifetime(None)
        .idle_timeout(None)
        .connection_timeout(config.timeout())
        .build(SqliteConnectionManager::memory())?;

    Ok(DatabasePool::SQLite(Arc::new(pool)))
}

/// One-line description of the global pool for health reporting.
///
/// Contains the word `healthy` only when a connection could be checked out.
pub fn get_connection_info() -> Option<String> {
    let DatabasePool::SQLite(pool) = DB_POOL.get()?;

    let conn = match pool.get() {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to get SQLite connection: {}", e);
            return Some(format!("SQLite connection error: {}", e));
        }
    };

    let location = conn
        .query_row("PRAGMA database_list", [], |row| row.get::<_, String>(2))
        .map(|path| match path.as_str() {
            "" | ":memory:" => "SQLite in-memory database".to_string(),
            path => format!("SQLite database at {}", path),
        })
        .unwrap_or_else(|_| "SQLite database (path unknown)".to_string());

    let state = pool.state();
    Some(format!(
        "{} healthy (connections: active={}, idle={})",
        location, state.connections, state.idle_connections
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.db_type, DatabaseType::Sqlite);
        assert_eq!(config.sqlite_path.as_deref(), Some(DEFAULT_SQLITE_PATH));
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    fn test_database_type_parse() {
        assert_eq!("sqlite".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
        assert_eq!(" SQLite ".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
        assert!(matches!(
            "mysql".parse::<DatabaseType>(),
            Err(DatabaseError::UnsupportedDatabaseType(_))
        ));
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("FAMILY_HEALTH_TEST_POOL", "lots");
        assert_eq!(env_or("FAMILY_HEALTH_TEST_POOL", 7u32), 7);
        env::set_var("FAMILY_HEALTH_TEST_POOL", "3");
        assert_eq!(env_or("FAMILY_HEALTH_TEST_POOL", 7u32), 3);
        assert_eq!(env_or("FAMILY_HEALTH_TEST_UNSET", 9u64), 9);
    }

    #[test]
    fn test_create_in_memory_pool_runs_migrations() {
        let DatabasePool::SQLite(pool) = create_database_pool(&DatabaseConfig::in_memory()).unwrap();
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_memory_pool_keeps_its_single_database() {
        let DatabasePool::SQLite(pool) = open_memory_pool(&DatabaseConfig::in_memory()).unwrap();
        assert_eq!(pool.max_size(), 1);

        pool.get()
            .unwrap()
            .execute_batch("CREATE TABLE kept (n INTEGER); INSERT INTO kept VALUES (7);")
            .unwrap();

        let n: i64 = pool.get()
            .unwrap()
            .query_row("SELECT n FROM kept", [], |row| row.get(0))
            .unwrap();
        assert_eq!(n, 7);
        assert_eq!(pool.state().connections, 1);
    }

    #[test]
    fn test_create_file_pool_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("family.db");
        let config = DatabaseConfig {
            sqlite_path: Some(path.to_string_lossy().to_string()),
            ..DatabaseConfig::default()
        };

        create_database_pool(&config).unwrap();
        assert!(path.exists());
    }
}
