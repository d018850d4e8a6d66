//! Ballot tallying
//!
//! Counts one ballot per member and evaluates the result against an
//! [`ApprovalThreshold`].

use super::ballot::Ballot;
use super::rule::FinalResult;
use super::threshold::ApprovalThreshold;
use crate::core::ids::{MemberId, RuleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregated ballots for one rule
///
/// Ballots cast for other rules are ignored. When a member shows up more
/// than once, the most recent ballot (highest id, unsaved last) wins, so a
/// revote never counts twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tally {
    pub rule: RuleId,
    pub yes_count: usize,
    pub no_count: usize,
    pub total: usize,
    /// Counted ballots, one per member, ordered by member id
    pub ballots: Vec<Ballot>,
}

impl Tally {
    pub fn from_ballots(rule: RuleId, ballots: impl IntoIterator<Item = Ballot>) -> Self {
        let mut latest: BTreeMap<MemberId, Ballot> = BTreeMap::new();
        for ballot in ballots.into_iter().filter(|b| b.annotation_rule == rule) {
            match latest.get(&ballot.member) {
                Some(existing) if recency(existing) > recency(&ballot) => {}
                _ => {
                    latest.insert(ballot.member, ballot);
                }
            }
        }

        let ballots: Vec<Ballot> = latest.into_values().collect();
        let yes_count = ballots.iter().filter(|b| b.answer).count();
        let total = ballots.len();

        Self {
            rule,
            yes_count,
            no_count: total - yes_count,
            total,
            ballots,
        }
    }

    /// Share of yes ballots in percent (0 with no ballots)
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.yes_count as f64 / self.total as f64 * 100.0
        }
    }

    pub fn has_voted(&self, member: MemberId) -> bool {
        self.ballots.iter().any(|b| b.member == member)
    }

    pub fn evaluate(&self, threshold: &ApprovalThreshold) -> FinalResult {
        if threshold.is_satisfied(self.yes_count, self.total) {
            FinalResult::Approved
        } else {
            FinalResult::Rejected
        }
    }

    /// Generate a visual vote summary (e.g., "[●●○]")
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for ballot in &self.ballots {
            summary.push(ballot.symbol());
        }
        summary.push(']');
        summary
    }
}

fn recency(ballot: &Ballot) -> (bool, u64) {
    (!ballot.id.is_persisted(), ballot.id.get())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::BallotId;

    fn ballot(id: u64, rule: u64, member: u64, answer: bool) -> Ballot {
        Ballot {
            id: BallotId::new(id),
            annotation_rule: RuleId::new(rule),
            member: MemberId::new(member),
            answer,
        }
    }

    #[test]
    fn test_counts() {
        let tally = Tally::from_ballots(
            RuleId::new(1),
            vec![ballot(1, 1, 10, true), ballot(2, 1, 11, true), ballot(3, 1, 12, false)],
        );
        assert_eq!(tally.yes_count, 2);
        assert_eq!(tally.no_count, 1);
        assert_eq!(tally.total, 3);
        assert_eq!(tally.vote_summary(), "[●●○]");
    }

    #[test]
    fn test_revote_does_not_double_count() {
        let tally = Tally::from_ballots(
            RuleId::new(1),
            vec![ballot(5, 1, 10, false), ballot(2, 1, 10, true), ballot(3, 1, 11, true)],
        );
        assert_eq!(tally.total, 2);
        // Ballot 5 is the latest for member 10
        assert_eq!(tally.yes_count, 1);
        assert!(tally.has_voted(MemberId::new(10)));
        assert!(!tally.has_voted(MemberId::new(12)));
    }

    #[test]
    fn test_unsaved_ballot_is_newest() {
        let tally = Tally::from_ballots(
            RuleId::new(1),
            vec![ballot(0, 1, 10, true), ballot(9, 1, 10, false)],
        );
        assert_eq!(tally.total, 1);
        assert_eq!(tally.yes_count, 1);
    }

    #[test]
    fn test_other_rules_are_ignored() {
        let tally = Tally::from_ballots(
            RuleId::new(1),
            vec![ballot(1, 1, 10, true), ballot(2, 2, 11, true)],
        );
        assert_eq!(tally.total, 1);
    }

    #[test]
    fn test_percentage() {
        let tally = Tally::from_ballots(
            RuleId::new(1),
            vec![ballot(1, 1, 10, true), ballot(2, 1, 11, false)],
        );
        assert_eq!(tally.percentage(), 50.0);
        assert_eq!(Tally::from_ballots(RuleId::new(1), vec![]).percentage(), 0.0);
    }

    #[test]
    fn test_evaluate() {
        let threshold = ApprovalThreshold::new(2, 50.0);
        let approved = Tally::from_ballots(
            RuleId::new(1),
            vec![ballot(1, 1, 10, true), ballot(2, 1, 11, true)],
        );
        assert_eq!(approved.evaluate(&threshold), FinalResult::Approved);

        let rejected = Tally::from_ballots(
            RuleId::new(1),
            vec![ballot(1, 1, 10, true), ballot(2, 1, 11, false)],
        );
        assert_eq!(rejected.evaluate(&threshold), FinalResult::Rejected);

        let empty = Tally::from_ballots(RuleId::new(1), vec![]);
        assert_eq!(empty.evaluate(&ApprovalThreshold::new(0, 0.0)), FinalResult::Rejected);
    }
}
