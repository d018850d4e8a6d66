//! Voting configuration: the parameters of one voting round

use super::threshold::ApprovalThreshold;
use crate::core::error::DomainError;
use crate::core::ids::{ConfigurationId, MemberId, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn initial_version() -> u64 {
    1
}

/// Voting round parameters shared by the rules that reference it
///
/// `is_closed` is terminal. `version` is bumped by exactly one on every
/// successful update and is used for optimistic concurrency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingConfiguration {
    #[serde(default)]
    pub id: ConfigurationId,
    pub project: ProjectId,
    pub voting_threshold: u32,
    pub percentage_threshold: f64,
    #[serde(default)]
    pub created_by: Option<MemberId>,
    pub begin_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default = "initial_version")]
    pub version: u64,
}

impl VotingConfiguration {
    /// Build a new, not yet persisted configuration.
    pub fn create(
        project: ProjectId,
        voting_threshold: u32,
        percentage_threshold: f64,
        created_by: Option<MemberId>,
        begin_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let config = Self {
            id: ConfigurationId::UNSAVED,
            project,
            voting_threshold,
            percentage_threshold,
            created_by,
            begin_date,
            end_date,
            is_closed: false,
            version: initial_version(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_percentage(self.percentage_threshold)?;
        if self.begin_date > self.end_date {
            return Err(DomainError::validation(format!(
                "begin date {} is after end date {}",
                self.begin_date.to_rfc3339(),
                self.end_date.to_rfc3339()
            )));
        }
        Ok(())
    }

    pub fn threshold(&self) -> ApprovalThreshold {
        ApprovalThreshold::new(self.voting_threshold, self.percentage_threshold)
    }

    pub fn is_open(&self) -> bool {
        !self.is_closed
    }

    /// True once the voting window has passed (strictly after `end_date`).
    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }

    /// Fail with [`DomainError::InvalidState`] if voting has already closed.
    pub fn ensure_open(&self, action: &str) -> Result<(), DomainError> {
        if self.is_closed {
            return Err(DomainError::invalid_state(format!(
                "cannot {} after voting configuration {} closed",
                action, self.id
            )));
        }
        Ok(())
    }

    /// Compute the configuration that results from applying `patch`.
    ///
    /// The returned value carries `version + 1`. Closed configurations only
    /// accept a repeated close; reopening or changing parameters fails.
    pub fn apply(&self, patch: &VotingConfigurationPatch) -> Result<Self, DomainError> {
        if patch.is_empty() {
            return Err(DomainError::validation(
                "voting configuration update has no fields",
            ));
        }
        if self.is_closed {
            if patch.is_closed == Some(false) {
                return Err(DomainError::invalid_state(format!(
                    "voting configuration {} is closed and cannot be reopened",
                    self.id
                )));
            }
            if patch.changes_parameters() {
                return Err(DomainError::invalid_state(format!(
                    "voting configuration {} is closed and its parameters are frozen",
                    self.id
                )));
            }
        }

        let next = Self {
            voting_threshold: patch.voting_threshold.unwrap_or(self.voting_threshold),
            percentage_threshold: patch
                .percentage_threshold
                .unwrap_or(self.percentage_threshold),
            begin_date: patch.begin_date.unwrap_or(self.begin_date),
            end_date: patch.end_date.unwrap_or(self.end_date),
            is_closed: self.is_closed || patch.is_closed.unwrap_or(false),
            version: self.version + 1,
            ..self.clone()
        };
        next.validate()?;
        Ok(next)
    }
}

/// Version number for a project's next voting round
pub fn next_round_version<'a>(
    existing: impl IntoIterator<Item = &'a VotingConfiguration>,
) -> u64 {
    existing
        .into_iter()
        .map(|c| c.version)
        .max()
        .map_or(initial_version(), |v| v + 1)
}

fn validate_percentage(value: f64) -> Result<(), DomainError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(DomainError::validation(format!(
            "percentage threshold must be within 0-100, got {}",
            value
        )));
    }
    Ok(())
}

/// Partial update of a voting configuration
///
/// `version` is filled in by the caller performing the versioned write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VotingConfigurationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_closed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl VotingConfigurationPatch {
    /// Patch performing the one-way close transition.
    pub fn close() -> Self {
        Self {
            is_closed: Some(true),
            ..Self::default()
        }
    }

    pub fn voting_threshold(mut self, value: u32) -> Self {
        self.voting_threshold = Some(value);
        self
    }

    pub fn percentage_threshold(mut self, value: f64) -> Self {
        self.percentage_threshold = Some(value);
        self
    }

    pub fn window(mut self, begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.begin_date = Some(begin);
        self.end_date = Some(end);
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.changes_parameters() && self.is_closed.is_none()
    }

    /// True when thresholds or the voting window change.
    pub fn changes_parameters(&self) -> bool {
        self.voting_threshold.is_some()
            || self.percentage_threshold.is_some()
            || self.begin_date.is_some()
            || self.end_date.is_some()
    }
}
