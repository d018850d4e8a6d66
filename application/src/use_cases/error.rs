//! Errors returned by the voting use cases

use crate::ports::repositories::ApiError;
use consensus_domain::{ConfigurationId, DomainError};
use thiserror::Error;

/// Coarse classification shared by every failure a use case can return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, caught before or by the backend
    Validation,
    NotFound,
    /// The stored entity moved on since it was read
    Conflict,
    /// Operation on an unpersisted id or a closed/finalized entity
    InvalidState,
    /// Missing credentials or missing project role
    PermissionDenied,
    Network,
    Timeout,
    Server,
}

/// Errors that can occur while running a voting use case
///
/// Nothing here is retried; callers decide how to present the failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VotingError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(
        "Voting configuration {id} changed since it was read (expected version {expected}, found {found})"
    )]
    VersionConflict {
        id: ConfigurationId,
        expected: u64,
        found: u64,
    },
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Server => "server",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl VotingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VotingError::Domain(DomainError::Validation(_)) => ErrorKind::Validation,
            VotingError::Domain(DomainError::InvalidState(_)) => ErrorKind::InvalidState,
            VotingError::VersionConflict { .. } => ErrorKind::Conflict,
            VotingError::Api(api) => match api {
                ApiError::NotFound(_) => ErrorKind::NotFound,
                ApiError::Conflict(_) => ErrorKind::Conflict,
                ApiError::BadRequest(_) => ErrorKind::Validation,
                ApiError::Unauthorized(_) | ApiError::Forbidden(_) => ErrorKind::PermissionDenied,
                ApiError::Network(_) => ErrorKind::Network,
                ApiError::Timeout => ErrorKind::Timeout,
                ApiError::Server { .. } | ApiError::Decode(_) => ErrorKind::Server,
            },
        }
    }

    /// Message suitable for end users
    pub fn user_message(&self) -> String {
        match self {
            VotingError::Api(api) => api.user_message(),
            VotingError::VersionConflict { .. } => {
                "Someone else changed this voting round. Reload it and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            VotingError::from(DomainError::validation("x")).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            VotingError::from(DomainError::invalid_state("x")).kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            VotingError::from(ApiError::NotFound("rule 1".into())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            VotingError::from(ApiError::BadRequest("bad".into())).kind(),
            ErrorKind::Validation
        );
        assert_eq!(VotingError::from(ApiError::Timeout).kind(), ErrorKind::Timeout);
        assert_eq!(
            VotingError::from(ApiError::Forbidden("not an admin".into())).kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            VotingError::from(ApiError::Unauthorized("no token".into())).kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(ErrorKind::PermissionDenied.as_str(), "permission_denied");
        assert_eq!(
            VotingError::VersionConflict {
                id: ConfigurationId::new(5),
                expected: 1,
                found: 2
            }
            .kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_domain_message_is_transparent() {
        let err = VotingError::from(DomainError::invalid_state("voting is closed"));
        assert_eq!(err.to_string(), "Invalid state: voting is closed");
        assert_eq!(err.user_message(), "Invalid state: voting is closed");
    }
}
