use thiserror::Error;
use crate::store::StoreError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Record failed a structural check before it reached the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Table client error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Row could not be mapped to or from its model
    #[error("Row mapping error: {0}")]
    Mapping(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_convert() {
        let err: RepositoryError = StoreError::InvalidIdentifier("bad name".to_string()).into();
        assert!(matches!(err, RepositoryError::Store(StoreError::InvalidIdentifier(_))));
        assert_eq!(err.to_string(), "Store error: Invalid identifier: bad name");
    }
}
