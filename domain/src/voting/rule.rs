//! Annotation rules and their consensus outcome

use crate::core::error::DomainError;
use crate::core::ids::{ConfigurationId, ProjectId, RuleId};
use serde::{Deserialize, Serialize};

/// Consensus outcome stored on a finalized rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinalResult {
    Approved,
    Rejected,
}

impl FinalResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalResult::Approved => "approved",
            FinalResult::Rejected => "rejected",
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, FinalResult::Approved)
    }
}

impl std::fmt::Display for FinalResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FinalResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approved" => Ok(FinalResult::Approved),
            "rejected" => Ok(FinalResult::Rejected),
            other => Err(format!(
                "Unknown final result: {}. Valid: approved, rejected",
                other
            )),
        }
    }
}

/// The backend stores `final_result` as a free string that stays empty until
/// the rule is finalized.
mod final_result_field {
    use super::FinalResult;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &Option<FinalResult>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.map(|r| r.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<FinalResult>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(D::Error::custom),
        }
    }
}

/// An annotation rule put to a vote
///
/// Created by a project admin, tied to one [`VotingConfiguration`](super::VotingConfiguration).
/// `final_result` and `is_finalized` are only written by finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRule {
    #[serde(default)]
    pub id: RuleId,
    pub project: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub voting_configuration: ConfigurationId,
    #[serde(default, with = "final_result_field")]
    pub final_result: Option<FinalResult>,
    #[serde(default)]
    pub is_finalized: bool,
}

impl AnnotationRule {
    /// Build a new, not yet persisted rule.
    pub fn create(
        project: ProjectId,
        name: impl Into<String>,
        description: impl Into<String>,
        voting_configuration: ConfigurationId,
    ) -> Result<Self, DomainError> {
        let rule = Self {
            id: RuleId::UNSAVED,
            project,
            name: name.into(),
            description: description.into(),
            voting_configuration,
            final_result: None,
            is_finalized: false,
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("rule name cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("rule description cannot be empty"));
        }
        if !self.voting_configuration.is_persisted() {
            return Err(DomainError::validation(
                "rule must reference an existing voting configuration",
            ));
        }
        Ok(())
    }

    /// Finalized rules are consensus records and are never deleted.
    pub fn ensure_deletable(&self) -> Result<(), DomainError> {
        self.id.ensure_persisted("delete")?;
        if self.is_finalized {
            return Err(DomainError::invalid_state(format!(
                "rule {} is finalized and cannot be deleted",
                self.id
            )));
        }
        Ok(())
    }

    /// Copy of this rule carrying a consensus outcome.
    pub fn with_outcome(&self, result: FinalResult) -> Self {
        Self {
            final_result: Some(result),
            is_finalized: true,
            ..self.clone()
        }
    }
}

/// Partial update of an annotation rule
///
/// Only the fields that are set are sent to the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRulePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_configuration: Option<ConfigurationId>,
}

impl AnnotationRulePatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn voting_configuration(mut self, id: ConfigurationId) -> Self {
        self.voting_configuration = Some(id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.voting_configuration.is_none()
    }

    /// Metadata edits (name, description) stay allowed after voting closes.
    pub fn is_metadata_only(&self) -> bool {
        self.voting_configuration.is_none()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.is_empty() {
            return Err(DomainError::validation("rule update has no fields"));
        }
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(DomainError::validation("rule name cannot be empty"));
        }
        if self
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            return Err(DomainError::validation("rule description cannot be empty"));
        }
        if self
            .voting_configuration
            .is_some_and(|id| !id.is_persisted())
        {
            return Err(DomainError::validation(
                "rule must reference an existing voting configuration",
            ));
        }
        Ok(())
    }

    /// Apply the patch to a rule, leaving unset fields untouched.
    pub fn apply_to(&self, rule: &AnnotationRule) -> AnnotationRule {
        AnnotationRule {
            name: self.name.clone().unwrap_or_else(|| rule.name.clone()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| rule.description.clone()),
            voting_configuration: self
                .voting_configuration
                .unwrap_or(rule.voting_configuration),
            ..rule.clone()
        }
    }
}

/// Body written by finalization; kept apart from [`AnnotationRulePatch`] so
/// user edits can never set an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    #[serde(with = "final_result_field")]
    pub final_result: Option<FinalResult>,
    pub is_finalized: bool,
}

impl RuleOutcome {
    pub fn finalized(result: FinalResult) -> Self {
        Self {
            final_result: Some(result),
            is_finalized: true,
        }
    }
}
