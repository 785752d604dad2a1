//! Validation error descriptors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Individual validation error for a specific field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ValidationError {
    /// Create a new validation error with the default code
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: "validation_failed".to_string(),
        }
    }

    /// Create a validation error with a specific code
    pub fn with_code(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_carries_field_and_message() {
        let error = ValidationError::new("email", "is not a valid address");
        assert_eq!(error.field, "email");
        assert_eq!(error.message, "is not a valid address");
        assert_eq!(error.code, "validation_failed");
        assert_eq!(error.to_string(), "email: is not a valid address");
    }

    #[test]
    fn error_with_code() {
        let error = ValidationError::with_code("age", "must be positive", "min");
        assert_eq!(error.code, "min");
    }
}
