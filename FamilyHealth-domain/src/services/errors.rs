use chrono::{Days, NaiveDate};
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use family_health_data::repository::RepositoryError;
use crate::logging::sanitize_for_log;

/// Errors returned by domain services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Request or stored data failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record does not exist or belongs to another user
    #[error("Not found: {0}")]
    NotFound(String),

    /// Not enough data to compute a result
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Map repository errors to service errors
pub fn map_repo_error(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
        RepositoryError::Validation(msg) => ServiceError::Validation(msg),
        RepositoryError::Mapping(e) => ServiceError::Validation(format!("Stored record is malformed: {}", e)),
        other => {
            let message = sanitize_for_log(&other.to_string());
            error!("Repository failure: {}", message);
            ServiceError::Repository(message)
        },
    }
}

/// Move a date by a signed number of days, failing outside the calendar range
pub fn offset_date(date: NaiveDate, days: i64) -> Result<NaiveDate, ServiceError> {
    let step = Days::new(days.unsigned_abs());
    let shifted = if days >= 0 {
        date.checked_add_days(step)
    } else {
        date.checked_sub_days(step)
    };

    shifted.ok_or_else(|| ServiceError::Validation(format!("Date {} moved by {} days is out of range", date, days)))
}

/// Convert validator errors to a single readable message
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let error_msgs: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, error_msgs.join(", "))
        })
        .collect();
    messages.sort();
    messages.join("; ")
}
