//! Application layer for rule-consensus
//!
//! This crate contains use cases and port definitions.
//! It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    progress::{NoProgress, SweepProgress},
    repositories::{
        AnnotationRuleRepository, ApiError, BallotRepository, Repositories,
        VotingConfigurationRepository,
    },
};
pub use use_cases::annotation_rules::AnnotationRuleService;
pub use use_cases::ballots::BallotService;
pub use use_cases::error::{ErrorKind, VotingError};
pub use use_cases::finalize::{FinalizationReport, FinalizeRuleUseCase};
pub use use_cases::sweep::{SweepExpiredVotingsUseCase, SweepFailure, SweepReport, SweepTarget};
pub use use_cases::voting_configurations::VotingConfigurationService;
