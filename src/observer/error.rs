use thiserror::Error;

use crate::contact::validation::FieldErrors;
use crate::database::DatabaseError;

/// Failures raised by observers; the first one stops the pipeline
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("{message}")]
    ValidationError {
        message: String,
        field_errors: Option<FieldErrors>,
    },

    #[error("Business rule violated: {0}")]
    BusinessRule(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Security error: {0}")]
    SecurityError(String),

    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        contact_id: Option<String>,
    },

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Pipeline execution failed: {0}")]
    PipelineError(String),
}

impl ObserverError {
    pub fn validation(message: impl Into<String>, field_errors: Option<FieldErrors>) -> Self {
        ObserverError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }
}
