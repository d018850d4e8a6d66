//! Repository ports
//!
//! Define how the application layer reaches the voting backend. The backend is
//! the store of record; implementations must not cache between calls.

use async_trait::async_trait;
use consensus_domain::{
    AnnotationRule, AnnotationRulePatch, Ballot, BallotId, BallotPatch, ConfigurationId,
    ProjectId, RuleId, RuleOutcome, VotingConfiguration, VotingConfigurationPatch,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors reported by repository implementations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rejected by backend: {0}")]
    BadRequest(String),

    /// HTTP 401: missing or invalid credentials
    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    /// HTTP 403: authenticated, but not allowed (e.g. not a project admin)
    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Connection error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Backend error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message suitable for end users, telling connectivity problems apart
    /// from backend outages and timeouts.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => {
                "Could not reach the voting server. Check your network connection.".to_string()
            }
            ApiError::Timeout => {
                "The voting server did not answer in time. Try again later.".to_string()
            }
            ApiError::Server { status: 503, .. } => {
                "The voting server's database is unavailable. Try again in a moment.".to_string()
            }
            ApiError::Server { .. } | ApiError::Decode(_) => {
                "The voting server is having problems. Try again later.".to_string()
            }
            ApiError::Unauthorized(_) => {
                "The voting server did not accept your credentials. Check api.token in the config."
                    .to_string()
            }
            ApiError::Forbidden(detail) => format!("Permission denied: {}", detail),
            ApiError::NotFound(what) => format!("{} does not exist.", capitalize(what)),
            ApiError::Conflict(detail) | ApiError::BadRequest(detail) => detail.clone(),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Annotation rules of a project
#[async_trait]
pub trait AnnotationRuleRepository: Send + Sync {
    async fn create(&self, project: ProjectId, rule: &AnnotationRule)
    -> Result<AnnotationRule, ApiError>;

    async fn list(&self, project: ProjectId) -> Result<Vec<AnnotationRule>, ApiError>;

    /// Fails with [`ApiError::NotFound`] for unknown ids
    async fn find_by_id(&self, project: ProjectId, id: RuleId) -> Result<AnnotationRule, ApiError>;

    async fn update(
        &self,
        project: ProjectId,
        id: RuleId,
        patch: &AnnotationRulePatch,
    ) -> Result<AnnotationRule, ApiError>;

    /// Write the consensus outcome computed by finalization
    async fn record_outcome(
        &self,
        project: ProjectId,
        id: RuleId,
        outcome: &RuleOutcome,
    ) -> Result<AnnotationRule, ApiError>;

    async fn delete(&self, project: ProjectId, id: RuleId) -> Result<AnnotationRule, ApiError>;
}

/// Voting rounds of a project
#[async_trait]
pub trait VotingConfigurationRepository: Send + Sync {
    async fn create(
        &self,
        project: ProjectId,
        config: &VotingConfiguration,
    ) -> Result<VotingConfiguration, ApiError>;

    async fn list(&self, project: ProjectId) -> Result<Vec<VotingConfiguration>, ApiError>;

    /// Fails with [`ApiError::NotFound`] for unknown ids
    async fn find_by_id(
        &self,
        project: ProjectId,
        id: ConfigurationId,
    ) -> Result<VotingConfiguration, ApiError>;

    async fn update(
        &self,
        project: ProjectId,
        id: ConfigurationId,
        patch: &VotingConfigurationPatch,
    ) -> Result<VotingConfiguration, ApiError>;
}

/// Ballots (annotation rule answers)
#[async_trait]
pub trait BallotRepository: Send + Sync {
    async fn create(&self, project: ProjectId, ballot: &Ballot) -> Result<Ballot, ApiError>;

    /// All ballots cast for one rule
    async fn list(&self, project: ProjectId, rule: RuleId) -> Result<Vec<Ballot>, ApiError>;

    /// Fails with [`ApiError::NotFound`] for unknown ids
    async fn find_by_id(&self, project: ProjectId, id: BallotId) -> Result<Ballot, ApiError>;

    async fn update(
        &self,
        project: ProjectId,
        id: BallotId,
        patch: &BallotPatch,
    ) -> Result<Ballot, ApiError>;

    async fn delete(&self, project: ProjectId, id: BallotId) -> Result<(), ApiError>;
}

/// The repositories a process works with, assembled once at startup and
/// handed to every service.
#[derive(Clone)]
pub struct Repositories {
    pub rules: Arc<dyn AnnotationRuleRepository>,
    pub configurations: Arc<dyn VotingConfigurationRepository>,
    pub ballots: Arc<dyn BallotRepository>,
}

impl Repositories {
    pub fn new(
        rules: Arc<dyn AnnotationRuleRepository>,
        configurations: Arc<dyn VotingConfigurationRepository>,
        ballots: Arc<dyn BallotRepository>,
    ) -> Self {
        Self {
            rules,
            configurations,
            ballots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_distinguishes_failures() {
        let network = ApiError::Network("refused".to_string()).user_message();
        let timeout = ApiError::Timeout.user_message();
        let outage = ApiError::Server {
            status: 503,
            message: "down".to_string(),
        }
        .user_message();

        assert!(network.contains("network"));
        assert!(timeout.contains("in time"));
        assert!(outage.contains("database is unavailable"));
        assert_ne!(network, timeout);
        assert_ne!(timeout, outage);

        let unavailable = ApiError::Server {
            status: 500,
            message: "boom".to_string(),
        }
        .user_message();
        assert_ne!(outage, unavailable);
        assert!(unavailable.contains("having problems"));
    }

    #[test]
    fn test_permission_failures_are_not_outages() {
        let forbidden =
            ApiError::Forbidden("You do not have permission to perform this action.".to_string());
        assert_eq!(
            forbidden.user_message(),
            "Permission denied: You do not have permission to perform this action."
        );
        assert!(!forbidden.user_message().contains("having problems"));

        let unauthorized = ApiError::Unauthorized("Invalid token.".to_string()).user_message();
        assert!(unauthorized.contains("api.token"));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(
            ApiError::NotFound("annotation rule 7".to_string()).user_message(),
            "Annotation rule 7 does not exist."
        );
    }

    #[test]
    fn test_display() {
        let err = ApiError::Server {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Backend error (HTTP 500): boom");
    }
}
