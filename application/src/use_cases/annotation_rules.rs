//! Rule registry use cases
//!
//! Create, read, update and delete annotation rules while enforcing the
//! voting lifecycle: unpersisted ids never reach the backend, rules in a
//! closed round only accept metadata edits, and finalized rules stay put.

use super::error::VotingError;
use crate::ports::repositories::{ApiError, Repositories};
use consensus_domain::{
    AnnotationRule, AnnotationRulePatch, ConfigurationId, DomainError, MemberId, ProjectId,
    RuleId, UnvotedRules,
};
use futures::future::join_all;
use std::collections::HashMap;
use tracing::{debug, info};

/// Application service for annotation rules
pub struct AnnotationRuleService {
    repos: Repositories,
}

impl AnnotationRuleService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Create a rule attached to an existing, open voting configuration
    pub async fn create(
        &self,
        project: ProjectId,
        name: impl Into<String>,
        description: impl Into<String>,
        voting_configuration: ConfigurationId,
    ) -> Result<AnnotationRule, VotingError> {
        let rule = AnnotationRule::create(project, name, description, voting_configuration)?;
        self.require_configuration(project, voting_configuration)
            .await?
            .ensure_open("propose a rule")?;

        let created = self.repos.rules.create(project, &rule).await?;
        info!(
            "Created annotation rule {} ({}) in project {}",
            created.id, created.name, project
        );
        Ok(created)
    }

    pub async fn list(&self, project: ProjectId) -> Result<Vec<AnnotationRule>, VotingError> {
        Ok(self.repos.rules.list(project).await?)
    }

    pub async fn find_by_id(
        &self,
        project: ProjectId,
        id: RuleId,
    ) -> Result<AnnotationRule, VotingError> {
        Ok(self.repos.rules.find_by_id(project, id).await?)
    }

    /// Rules in open rounds on which `member` has not voted yet
    pub async fn list_unvoted(
        &self,
        project: ProjectId,
        member: MemberId,
    ) -> Result<UnvotedRules, VotingError> {
        let (rules, configurations) = futures::try_join!(
            self.repos.rules.list(project),
            self.repos.configurations.list(project)
        )?;

        let candidates: Vec<RuleId> = rules
            .iter()
            .filter(|rule| !rule.is_finalized)
            .filter(|rule| {
                configurations
                    .iter()
                    .any(|c| c.id == rule.voting_configuration && c.is_open())
            })
            .map(|rule| rule.id)
            .collect();

        debug!(
            "Fetching ballots for {} open rules in project {}",
            candidates.len(),
            project
        );
        let fetched = join_all(
            candidates
                .iter()
                .map(|id| self.repos.ballots.list(project, *id)),
        )
        .await;

        let mut ballots_by_rule = HashMap::with_capacity(candidates.len());
        for (id, ballots) in candidates.into_iter().zip(fetched) {
            ballots_by_rule.insert(id, ballots?);
        }

        Ok(UnvotedRules::collect(
            member,
            rules,
            configurations,
            &ballots_by_rule,
        ))
    }

    /// Apply a partial update to a persisted rule
    pub async fn update(
        &self,
        project: ProjectId,
        id: RuleId,
        patch: &AnnotationRulePatch,
    ) -> Result<AnnotationRule, VotingError> {
        id.ensure_persisted("update")?;
        patch.validate()?;

        let current = self.repos.rules.find_by_id(project, id).await?;
        if !patch.is_metadata_only() {
            if current.is_finalized {
                return Err(DomainError::invalid_state(format!(
                    "rule {} is finalized; only its name and description can change",
                    id
                ))
                .into());
            }
            let config = self
                .repos
                .configurations
                .find_by_id(project, current.voting_configuration)
                .await?;
            config.ensure_open("move a rule out of its voting round")?;

            if let Some(target) = patch.voting_configuration {
                let target = self.require_configuration(project, target).await?;
                target.ensure_open("move a rule into a voting round")?;
            }
        }

        let updated = self.repos.rules.update(project, id, patch).await?;
        info!("Updated annotation rule {} in project {}", id, project);
        Ok(updated)
    }

    /// Delete a persisted, not yet finalized rule
    pub async fn delete(
        &self,
        project: ProjectId,
        id: RuleId,
    ) -> Result<AnnotationRule, VotingError> {
        id.ensure_persisted("delete")?;

        let current = self.repos.rules.find_by_id(project, id).await?;
        current.ensure_deletable()?;

        let deleted = self.repos.rules.delete(project, id).await?;
        info!("Deleted annotation rule {} in project {}", id, project);
        Ok(deleted)
    }

    /// Load a configuration a rule is about to reference; a missing one is
    /// bad input rather than a missing resource.
    async fn require_configuration(
        &self,
        project: ProjectId,
        id: ConfigurationId,
    ) -> Result<consensus_domain::VotingConfiguration, VotingError> {
        match self.repos.configurations.find_by_id(project, id).await {
            Ok(config) => Ok(config),
            Err(ApiError::NotFound(_)) => Err(DomainError::validation(format!(
                "voting configuration {} does not exist",
                id
            ))
            .into()),
            Err(e) => Err(e.into()),
        }
    }
}
