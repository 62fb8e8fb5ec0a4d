// Repository module structure
pub mod errors;
pub mod schema;
mod table;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use schema::TableSchema;
pub use table::{TableRecord, TableRepository};

/// Test doubles for the table client
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use async_trait::async_trait;

    use crate::store::{Filter, Query, Row, StoreError, TableClient};

    /// Table client whose every call fails, for exercising error paths
    #[derive(Debug, Clone, Default)]
    pub struct FailingTableClient;

    impl FailingTableClient {
        /// Create a failing client
        pub fn new() -> Self {
            Self
        }

        fn failure() -> StoreError {
            StoreError::Lock("store unavailable".to_string())
        }
    }

    #[async_trait]
    impl TableClient for FailingTableClient {
        async fn select(&self, _table: &str, _query: &Query) -> Result<Vec<Row>, StoreError> {
            Err(Self::failure())
        }

        async fn insert(&self, _table: &str, _row: Row) -> Result<Row, StoreError> {
            Err(Self::failure())
        }

        async fn update(&self, _table: &str, _filters: &[Filter], _patch: Row) -> Result<Vec<Row>, StoreError> {
            Err(Self::failure())
        }

        async fn delete(&self, _table: &str, _filters: &[Filter]) -> Result<usize, StoreError> {
            Err(Self::failure())
        }
    }
}
