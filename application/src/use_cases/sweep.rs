//! Sweep Expired Votings use case
//!
//! Closes every open voting configuration whose window has passed and then
//! finalizes all pending rules of closed configurations. Failures on one
//! entity are collected and the sweep carries on with the rest.

use super::error::VotingError;
use super::finalize::FinalizeRuleUseCase;
use super::voting_configurations::VotingConfigurationService;
use crate::ports::progress::{NoProgress, SweepProgress};
use crate::ports::repositories::Repositories;
use chrono::{DateTime, Utc};
use consensus_domain::{ConfigurationId, FinalResult, ProjectId, RuleId};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Entity a sweep step failed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTarget {
    Configuration(ConfigurationId),
    Rule(RuleId),
}

impl std::fmt::Display for SweepTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepTarget::Configuration(id) => write!(f, "voting configuration {}", id),
            SweepTarget::Rule(id) => write!(f, "rule {}", id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepFailure {
    pub target: SweepTarget,
    pub error: VotingError,
}

/// What a sweep did
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Configurations closed by this sweep
    pub closed: Vec<ConfigurationId>,
    /// Rules finalized by this sweep
    pub finalized: Vec<(RuleId, FinalResult)>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Use case for closing expired rounds and finalizing their rules
pub struct SweepExpiredVotingsUseCase {
    repos: Repositories,
}

impl SweepExpiredVotingsUseCase {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn execute(
        &self,
        project: ProjectId,
        now: DateTime<Utc>,
    ) -> Result<SweepReport, VotingError> {
        self.execute_with_progress(project, now, &NoProgress).await
    }

    /// Listing failures abort the sweep; per-entity failures are reported.
    pub async fn execute_with_progress(
        &self,
        project: ProjectId,
        now: DateTime<Utc>,
        progress: &dyn SweepProgress,
    ) -> Result<SweepReport, VotingError> {
        let configurations = self.repos.configurations.list(project).await?;
        let expired: Vec<_> = configurations
            .iter()
            .filter(|c| c.is_open() && c.has_expired(now))
            .collect();

        info!(
            "Sweeping project {}: {} of {} voting configurations expired",
            project,
            expired.len(),
            configurations.len()
        );
        progress.on_sweep_start(expired.len());

        let mut report = SweepReport::default();
        let mut closed: HashSet<ConfigurationId> = configurations
            .iter()
            .filter(|c| c.is_closed)
            .map(|c| c.id)
            .collect();

        let config_service = VotingConfigurationService::new(self.repos.clone());
        for config in expired {
            match config_service.close(project, config.id, config.version).await {
                Ok(_) => {
                    debug!("Closed expired voting configuration {}", config.id);
                    closed.insert(config.id);
                    report.closed.push(config.id);
                    progress.on_configuration_closed(config.id);
                }
                Err(error) => {
                    warn!("Failed to close voting configuration {}: {}", config.id, error);
                    report.failures.push(SweepFailure {
                        target: SweepTarget::Configuration(config.id),
                        error,
                    });
                }
            }
        }

        let pending: Vec<RuleId> = self
            .repos
            .rules
            .list(project)
            .await?
            .into_iter()
            .filter(|rule| !rule.is_finalized && closed.contains(&rule.voting_configuration))
            .map(|rule| rule.id)
            .collect();

        let finalizer = FinalizeRuleUseCase::new(self.repos.clone());
        for rule_id in pending {
            match finalizer.execute(project, rule_id).await {
                Ok(outcome) => {
                    if outcome.newly_finalized {
                        report.finalized.push((rule_id, outcome.result));
                    }
                    progress.on_rule_finalized(rule_id, Some(outcome.result));
                }
                Err(error) => {
                    warn!("Failed to finalize rule {}: {}", rule_id, error);
                    progress.on_rule_finalized(rule_id, None);
                    report.failures.push(SweepFailure {
                        target: SweepTarget::Rule(rule_id),
                        error,
                    });
                }
            }
        }

        progress.on_sweep_complete();
        info!(
            "Sweep of project {} closed {} configurations, finalized {} rules, {} failures",
            project,
            report.closed.len(),
            report.finalized.len(),
            report.failures.len()
        );
        Ok(report)
    }
}
