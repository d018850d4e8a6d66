//! Voting configuration use cases
//!
//! Every update is a versioned write: the caller names the version it read,
//! the stored version is re-read, and the write only happens when both agree.

use super::error::VotingError;
use crate::ports::repositories::Repositories;
use chrono::{DateTime, Utc};
use consensus_domain::{
    ConfigurationId, DomainError, MemberId, ProjectId, VotingConfiguration,
    VotingConfigurationPatch, next_round_version,
};
use tracing::{debug, info};

/// Application service for voting configurations
pub struct VotingConfigurationService {
    repos: Repositories,
}

impl VotingConfigurationService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Open a new voting round.
    ///
    /// A project runs one round at a time. A still-open round whose rules are
    /// all finalized (or that has none) is closed first; one with pending
    /// rules blocks the new round. The new round takes the project's next
    /// version number.
    pub async fn create(
        &self,
        project: ProjectId,
        voting_threshold: u32,
        percentage_threshold: f64,
        created_by: Option<MemberId>,
        begin_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<VotingConfiguration, VotingError> {
        let mut config = VotingConfiguration::create(
            project,
            voting_threshold,
            percentage_threshold,
            created_by,
            begin_date,
            end_date,
        )?;

        let (mut configurations, rules) = futures::try_join!(
            self.repos.configurations.list(project),
            self.repos.rules.list(project),
        )?;

        for active in configurations.iter().filter(|c| c.is_open()) {
            let pending = rules
                .iter()
                .filter(|r| r.voting_configuration == active.id && !r.is_finalized)
                .count();
            if pending > 0 {
                return Err(DomainError::invalid_state(format!(
                    "voting configuration {} is still active with {} unfinalized rule(s)",
                    active.id, pending
                ))
                .into());
            }
        }

        for active in configurations.iter_mut().filter(|c| c.is_open()) {
            info!(
                "Closing voting configuration {} before opening a new round",
                active.id
            );
            *active = self.close(project, active.id, active.version).await?;
        }

        config.version = next_round_version(&configurations);
        let created = self.repos.configurations.create(project, &config).await?;
        info!(
            "Created voting configuration {} in project {} ({})",
            created.id,
            project,
            created.threshold()
        );
        Ok(created)
    }

    pub async fn list(&self, project: ProjectId) -> Result<Vec<VotingConfiguration>, VotingError> {
        Ok(self.repos.configurations.list(project).await?)
    }

    pub async fn find_by_id(
        &self,
        project: ProjectId,
        id: ConfigurationId,
    ) -> Result<VotingConfiguration, VotingError> {
        Ok(self.repos.configurations.find_by_id(project, id).await?)
    }

    /// Apply `patch` on top of `base_version`.
    ///
    /// Fails with [`VotingError::VersionConflict`] without writing when the
    /// stored configuration has moved past `base_version`.
    pub async fn update(
        &self,
        project: ProjectId,
        id: ConfigurationId,
        base_version: u64,
        patch: &VotingConfigurationPatch,
    ) -> Result<VotingConfiguration, VotingError> {
        id.ensure_persisted("update")?;

        let stored = self.repos.configurations.find_by_id(project, id).await?;
        if stored.version != base_version {
            return Err(VotingError::VersionConflict {
                id,
                expected: base_version,
                found: stored.version,
            });
        }

        let next = stored.apply(patch)?;
        let versioned = patch.clone().with_version(next.version);
        let updated = self
            .repos
            .configurations
            .update(project, id, &versioned)
            .await?;

        if updated.version != next.version {
            debug!(
                "Backend reported version {} for configuration {} (expected {})",
                updated.version, id, next.version
            );
        }
        info!(
            "Updated voting configuration {} to version {}",
            id, next.version
        );
        Ok(updated)
    }

    /// Close a voting round. Closing an already closed round writes nothing.
    pub async fn close(
        &self,
        project: ProjectId,
        id: ConfigurationId,
        base_version: u64,
    ) -> Result<VotingConfiguration, VotingError> {
        id.ensure_persisted("close")?;

        let stored = self.repos.configurations.find_by_id(project, id).await?;
        if stored.is_closed {
            debug!("Voting configuration {} is already closed", id);
            return Ok(stored);
        }
        self.update(project, id, base_version, &VotingConfigurationPatch::close())
            .await
    }
}
