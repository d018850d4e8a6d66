//! Finalize Rule use case
//!
//! Tallies the ballots of a rule whose round has closed and records the
//! outcome. Finalizing twice is a no-op that reports the stored outcome.

use super::error::VotingError;
use crate::ports::repositories::Repositories;
use consensus_domain::{
    AnnotationRule, FinalResult, FinalizationDecision, ProjectId, RuleId, RuleOutcome, Tally,
    decide,
};
use tracing::{info, warn};

/// Result of finalizing one rule
#[derive(Debug, Clone)]
pub struct FinalizationReport {
    /// The rule as stored after finalization
    pub rule: AnnotationRule,
    pub tally: Tally,
    pub result: FinalResult,
    /// False when the rule had already been finalized
    pub newly_finalized: bool,
}

/// Use case for finalizing a single rule
pub struct FinalizeRuleUseCase {
    repos: Repositories,
}

impl FinalizeRuleUseCase {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn execute(
        &self,
        project: ProjectId,
        rule_id: RuleId,
    ) -> Result<FinalizationReport, VotingError> {
        rule_id.ensure_persisted("finalize")?;

        let rule = self.repos.rules.find_by_id(project, rule_id).await?;
        let (config, ballots) = futures::try_join!(
            self.repos
                .configurations
                .find_by_id(project, rule.voting_configuration),
            self.repos.ballots.list(project, rule_id)
        )?;

        let tally = Tally::from_ballots(rule_id, ballots);
        let decision = decide(&rule, &config, &tally)?;

        match decision {
            FinalizationDecision::Record(result) => {
                let stored = self
                    .repos
                    .rules
                    .record_outcome(project, rule_id, &RuleOutcome::finalized(result))
                    .await?;
                info!(
                    "Finalized rule {} as {} {} ({:.1}% of {})",
                    rule_id,
                    result,
                    tally.vote_summary(),
                    tally.percentage(),
                    tally.total
                );
                Ok(FinalizationReport {
                    rule: stored,
                    tally,
                    result,
                    newly_finalized: true,
                })
            }
            FinalizationDecision::Unchanged { stored, recomputed } => {
                if decision.is_divergent() {
                    warn!(
                        "Rule {} is finalized as {} but its ballots now tally to {}",
                        rule_id, stored, recomputed
                    );
                }
                Ok(FinalizationReport {
                    rule,
                    tally,
                    result: stored,
                    newly_finalized: false,
                })
            }
        }
    }
}
