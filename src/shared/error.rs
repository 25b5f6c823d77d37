//! Shared Error Types
//!
//! Errors raised before any component-specific work starts: local input
//! validation of the login and registration forms and of score edits.
//! Nothing that fails this check is ever sent to the server.
//!
//! # Usage
//!
//! ```rust
//! use edusync::shared::error::SharedError;
//!
//! let error = SharedError::validation("confirmPassword", "Passwords do not match");
//! assert_eq!(error.field(), Some("confirmPassword"));
//! ```
use thiserror::Error;

/// Errors shared across the client components
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SharedError {
    /// Input validation error
    #[error("{message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field that failed validation, named as the form names it
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ValidationError { field, .. } => Some(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_displays_message_only() {
        let error = SharedError::validation("email", "Email is not valid");
        assert_eq!(error.field(), Some("email"));
        assert_eq!(error.to_string(), "Email is not valid");
    }

    #[test]
    fn test_validation_error_fields() {
        let error = SharedError::validation("score", "Score cannot be negative");
        assert_eq!(
            error,
            SharedError::ValidationError {
                field: "score".to_string(),
                message: "Score cannot be negative".to_string(),
            }
        );
    }
}
