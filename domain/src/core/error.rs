//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Raised by entity factories and guards before any I/O happens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        DomainError::InvalidState(message.into())
    }

    /// Check if this error was caused by malformed input
    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }

    /// Check if this error was caused by an operation the entity's state forbids
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, DomainError::InvalidState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::validation("name cannot be empty");
        assert_eq!(error.to_string(), "Validation failed: name cannot be empty");

        let error = DomainError::invalid_state("voting is closed");
        assert_eq!(error.to_string(), "Invalid state: voting is closed");
    }

    #[test]
    fn test_kind_checks() {
        assert!(DomainError::validation("x").is_validation());
        assert!(!DomainError::validation("x").is_invalid_state());
        assert!(DomainError::invalid_state("x").is_invalid_state());
    }
}
