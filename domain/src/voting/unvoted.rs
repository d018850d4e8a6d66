//! Rules still waiting for a member's ballot

use super::ballot::Ballot;
use super::configuration::VotingConfiguration;
use super::rule::AnnotationRule;
use crate::core::ids::{ConfigurationId, MemberId, RuleId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Open rules a member has not voted on, plus the voting rounds still running
///
/// `total_unvoted_rules` feeds notification badges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnvotedRules {
    pub rules: Vec<AnnotationRule>,
    pub active_votings: Vec<VotingConfiguration>,
    pub total_unvoted_rules: usize,
}

impl UnvotedRules {
    /// Select rules whose configuration is open and on which `member` has no ballot.
    ///
    /// Rules whose configuration is missing from `configurations` are skipped.
    pub fn collect(
        member: MemberId,
        rules: Vec<AnnotationRule>,
        configurations: Vec<VotingConfiguration>,
        ballots_by_rule: &HashMap<RuleId, Vec<Ballot>>,
    ) -> Self {
        let active_votings: Vec<VotingConfiguration> =
            configurations.into_iter().filter(|c| c.is_open()).collect();
        let open: HashSet<ConfigurationId> = active_votings.iter().map(|c| c.id).collect();

        let rules: Vec<AnnotationRule> = rules
            .into_iter()
            .filter(|rule| !rule.is_finalized && open.contains(&rule.voting_configuration))
            .filter(|rule| {
                !ballots_by_rule
                    .get(&rule.id)
                    .is_some_and(|ballots| ballots.iter().any(|b| b.member == member))
            })
            .collect();

        Self {
            total_unvoted_rules: rules.len(),
            rules,
            active_votings,
        }
    }
}
