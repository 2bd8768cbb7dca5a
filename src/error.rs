//! Error taxonomy for store and analysis operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarksError {
    /// A form field is missing, empty, or not an integer where one is required.
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("student not found: {roll_no}")]
    NotFound { roll_no: String },

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl MarksError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        MarksError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(roll_no: &str) -> Self {
        MarksError::NotFound {
            roll_no: roll_no.to_string(),
        }
    }
}
