//! Ballots: one member's yes/no answer on an annotation rule

use crate::core::error::DomainError;
use crate::core::ids::{BallotId, MemberId, RuleId};
use serde::{Deserialize, Serialize};

/// A single member's vote on an annotation rule
///
/// The backend calls this an "annotation rule answer". At most one ballot
/// exists per `(annotation_rule, member)` pair.
///
/// # Example
///
/// ```
/// use consensus_domain::{Ballot, MemberId, RuleId};
///
/// let ballot = Ballot::yes(RuleId::new(7), MemberId::new(10)).unwrap();
/// assert!(ballot.answer);
/// assert!(!ballot.id.is_persisted());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    #[serde(default)]
    pub id: BallotId,
    pub annotation_rule: RuleId,
    pub member: MemberId,
    pub answer: bool,
}

impl Ballot {
    /// Build a new, not yet persisted ballot.
    pub fn new(annotation_rule: RuleId, member: MemberId, answer: bool) -> Result<Self, DomainError> {
        if !annotation_rule.is_persisted() {
            return Err(DomainError::validation(
                "ballot must reference a persisted annotation rule",
            ));
        }
        if !member.is_persisted() {
            return Err(DomainError::validation("ballot must reference a member"));
        }
        Ok(Self {
            id: BallotId::UNSAVED,
            annotation_rule,
            member,
            answer,
        })
    }

    pub fn yes(annotation_rule: RuleId, member: MemberId) -> Result<Self, DomainError> {
        Self::new(annotation_rule, member, true)
    }

    pub fn no(annotation_rule: RuleId, member: MemberId) -> Result<Self, DomainError> {
        Self::new(annotation_rule, member, false)
    }

    /// One-character marker used in vote summaries
    pub fn symbol(&self) -> char {
        if self.answer { '●' } else { '○' }
    }
}

/// Partial update of a ballot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<bool>,
}

impl BallotPatch {
    pub fn answer(answer: bool) -> Self {
        Self {
            answer: Some(answer),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.answer.is_none()
    }

    pub fn apply_to(&self, ballot: &Ballot) -> Ballot {
        Ballot {
            answer: self.answer.unwrap_or(ballot.answer),
            ..ballot.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ballot_creation() {
        let ballot = Ballot::no(RuleId::new(1), MemberId::new(2)).unwrap();
        assert!(!ballot.answer);
        assert_eq!(ballot.id, BallotId::UNSAVED);
        assert_eq!(ballot.symbol(), '○');
    }

    #[test]
    fn test_ballot_requires_ids() {
        assert!(Ballot::yes(RuleId::UNSAVED, MemberId::new(2)).unwrap_err().is_validation());
        assert!(Ballot::yes(RuleId::new(1), MemberId::UNSAVED).unwrap_err().is_validation());
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{"id": 3, "annotation_rule": 7, "member": 10, "answer": true}"#;
        let ballot: Ballot = serde_json::from_str(json).unwrap();
        assert_eq!(ballot.id, BallotId::new(3));
        assert_eq!(ballot.member, MemberId::new(10));
        assert!(ballot.answer);
    }

    #[test]
    fn test_patch() {
        let ballot = Ballot::yes(RuleId::new(1), MemberId::new(2)).unwrap();
        let changed = BallotPatch::answer(false).apply_to(&ballot);
        assert!(!changed.answer);
        assert!(BallotPatch::default().is_empty());
        assert_eq!(
            serde_json::to_value(BallotPatch::answer(true)).unwrap(),
            serde_json::json!({"answer": true})
        );
    }
}
