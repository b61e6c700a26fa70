//! Validation error types

use thiserror::Error;

/// Validation error for request fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field is missing or blank
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field exceeds maximum length
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Field doesn't match its required format
    #[error("{field}: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field } | Self::TooLong { field, .. } | Self::InvalidFormat { field, .. } => {
                field
            }
        }
    }
}
