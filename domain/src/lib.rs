//! Domain layer for rule-consensus
//!
//! This crate contains the entities, value objects and consensus rules of the
//! annotation rule voting workflow. It has no dependencies on infrastructure
//! or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Annotation rule**: a labeling guideline proposed to a project
//! - **Voting configuration**: thresholds and window of one voting round
//! - **Ballot**: a member's yes/no answer on a rule
//! - **Finalization**: irreversible tally of a closed round into `approved`/`rejected`

pub mod core;
pub mod voting;

// Re-export commonly used types
pub use crate::core::{
    error::DomainError,
    ids::{BallotId, ConfigurationId, MemberId, ProjectId, RuleId},
};
pub use voting::{
    AnnotationRule, AnnotationRulePatch, ApprovalThreshold, Ballot, BallotPatch,
    FinalResult, FinalizationDecision, RuleOutcome, RuleState, Tally, UnvotedRules,
    VotingConfiguration, VotingConfigurationPatch, decide, next_round_version,
};
