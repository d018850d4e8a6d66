//! Rule lifecycle and finalization decisions
//!
//! ```text
//! OPEN ──(end date passes / admin closes)──▶ CLOSED_PENDING_TALLY ──(tally)──▶ FINALIZED
//! ```
//!
//! `FINALIZED` is terminal.

use super::configuration::VotingConfiguration;
use super::rule::{AnnotationRule, FinalResult};
use super::tally::Tally;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Where a rule stands in its voting round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleState {
    /// Configuration accepts ballots
    Open,
    /// Configuration closed, outcome not computed yet
    ClosedPendingTally,
    /// Outcome recorded
    Finalized,
}

impl RuleState {
    pub fn of(rule: &AnnotationRule, config: &VotingConfiguration) -> Self {
        if rule.is_finalized {
            RuleState::Finalized
        } else if config.is_closed {
            RuleState::ClosedPendingTally
        } else {
            RuleState::Open
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleState::Open => "open",
            RuleState::ClosedPendingTally => "closed_pending_tally",
            RuleState::Finalized => "finalized",
        }
    }
}

impl std::fmt::Display for RuleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What finalization should do with a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizationDecision {
    /// Record this outcome on the rule
    Record(FinalResult),
    /// Rule already finalized; nothing is written
    Unchanged {
        stored: FinalResult,
        recomputed: FinalResult,
    },
}

impl FinalizationDecision {
    /// The outcome the rule ends up with
    pub fn result(&self) -> FinalResult {
        match self {
            FinalizationDecision::Record(result) => *result,
            FinalizationDecision::Unchanged { stored, .. } => *stored,
        }
    }

    /// An already finalized rule whose recomputed tally disagrees with the
    /// stored outcome. Only possible if ballots changed after close.
    pub fn is_divergent(&self) -> bool {
        matches!(self, FinalizationDecision::Unchanged { stored, recomputed } if stored != recomputed)
    }
}

/// Decide the outcome of `rule` from its configuration and tally.
pub fn decide(
    rule: &AnnotationRule,
    config: &VotingConfiguration,
    tally: &Tally,
) -> Result<FinalizationDecision, DomainError> {
    rule.id.ensure_persisted("finalize")?;
    if rule.voting_configuration != config.id {
        return Err(DomainError::validation(format!(
            "rule {} belongs to voting configuration {}, not {}",
            rule.id, rule.voting_configuration, config.id
        )));
    }
    if tally.rule != rule.id {
        return Err(DomainError::validation(format!(
            "tally for rule {} cannot finalize rule {}",
            tally.rule, rule.id
        )));
    }

    let recomputed = tally.evaluate(&config.threshold());

    match RuleState::of(rule, config) {
        RuleState::Open => Err(DomainError::invalid_state(format!(
            "rule {} cannot be finalized while voting configuration {} is open",
            rule.id, config.id
        ))),
        RuleState::ClosedPendingTally => Ok(FinalizationDecision::Record(recomputed)),
        RuleState::Finalized => Ok(FinalizationDecision::Unchanged {
            stored: rule.final_result.unwrap_or(recomputed),
            recomputed,
        }),
    }
}
