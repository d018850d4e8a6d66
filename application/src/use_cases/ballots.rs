//! Ballot use cases
//!
//! Ballots can only be written while their rule's round is open. Casting is
//! an explicit upsert keyed by `(rule, member)`.

use super::error::VotingError;
use crate::ports::repositories::Repositories;
use consensus_domain::{
    AnnotationRule, Ballot, BallotId, BallotPatch, DomainError, MemberId, ProjectId, RuleId,
};
use tracing::{debug, info};

/// Application service for ballots
pub struct BallotService {
    repos: Repositories,
}

impl BallotService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Record `member`'s answer on `rule`.
    ///
    /// Creates the ballot on a first vote and updates the existing one on a
    /// revote. Repeating the same answer writes nothing.
    pub async fn save(
        &self,
        project: ProjectId,
        rule: RuleId,
        member: MemberId,
        answer: bool,
    ) -> Result<Ballot, VotingError> {
        let ballot = Ballot::new(rule, member, answer)?;
        self.ensure_accepting_ballots(project, rule).await?;

        let existing = self
            .repos
            .ballots
            .list(project, rule)
            .await?
            .into_iter()
            .filter(|b| b.member == member)
            .max_by_key(|b| b.id);

        match existing {
            Some(current) if current.answer == answer => {
                debug!(
                    "Member {} already answered {} on rule {}",
                    member, answer, rule
                );
                Ok(current)
            }
            Some(current) => {
                let updated = self
                    .repos
                    .ballots
                    .update(project, current.id, &BallotPatch::answer(answer))
                    .await?;
                info!("Member {} changed vote on rule {} to {}", member, rule, answer);
                Ok(updated)
            }
            None => {
                let created = self.repos.ballots.create(project, &ballot).await?;
                info!("Member {} voted {} on rule {}", member, answer, rule);
                Ok(created)
            }
        }
    }

    pub async fn list(&self, project: ProjectId, rule: RuleId) -> Result<Vec<Ballot>, VotingError> {
        Ok(self.repos.ballots.list(project, rule).await?)
    }

    pub async fn find_by_id(&self, project: ProjectId, id: BallotId) -> Result<Ballot, VotingError> {
        Ok(self.repos.ballots.find_by_id(project, id).await?)
    }

    pub async fn update(
        &self,
        project: ProjectId,
        id: BallotId,
        patch: &BallotPatch,
    ) -> Result<Ballot, VotingError> {
        id.ensure_persisted("update")?;
        if patch.is_empty() {
            return Err(DomainError::validation("ballot update has no fields").into());
        }

        let current = self.repos.ballots.find_by_id(project, id).await?;
        self.ensure_accepting_ballots(project, current.annotation_rule)
            .await?;

        let updated = self.repos.ballots.update(project, id, patch).await?;
        info!("Updated ballot {} on rule {}", id, updated.annotation_rule);
        Ok(updated)
    }

    pub async fn delete(&self, project: ProjectId, id: BallotId) -> Result<(), VotingError> {
        id.ensure_persisted("delete")?;

        let current = self.repos.ballots.find_by_id(project, id).await?;
        self.ensure_accepting_ballots(project, current.annotation_rule)
            .await?;

        self.repos.ballots.delete(project, id).await?;
        info!("Deleted ballot {} on rule {}", id, current.annotation_rule);
        Ok(())
    }

    async fn ensure_accepting_ballots(
        &self,
        project: ProjectId,
        rule: RuleId,
    ) -> Result<AnnotationRule, VotingError> {
        let rule = self.repos.rules.find_by_id(project, rule).await?;
        if rule.is_finalized {
            return Err(DomainError::invalid_state(format!(
                "rule {} is finalized and no longer accepts ballots",
                rule.id
            ))
            .into());
        }
        let config = self
            .repos
            .configurations
            .find_by_id(project, rule.voting_configuration)
            .await?;
        config.ensure_open("change ballots")?;
        Ok(rule)
    }
}
