//! Console output formatter for voting results

use colored::Colorize;
use consensus_application::{FinalizationReport, SweepReport};
use consensus_domain::{
    AnnotationRule, Ballot, FinalResult, Tally, UnvotedRules, VotingConfiguration,
};
use serde::Serialize;
use serde_json::json;

/// Formats entities and reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn format_rules(rules: &[AnnotationRule]) -> String {
        if rules.is_empty() {
            return format!("{}\n", "No annotation rules.".dimmed());
        }

        let mut output = format!(
            "{}\n",
            format!(
                "{:>6}  {:<28} {:>8}  {:<10}",
                "ID", "NAME", "VOTING", "RESULT"
            )
            .bold()
        );
        for rule in rules {
            output.push_str(&format!(
                "{:>6}  {:<28} {:>8}  {}\n",
                rule.id,
                Self::truncate(&rule.name, 28),
                rule.voting_configuration,
                Self::result_label(rule)
            ));
        }
        output
    }

    pub fn format_rule(rule: &AnnotationRule) -> String {
        let mut output = Self::header(&format!("Annotation rule {}", rule.id));
        output.push_str(&Self::field("Name", &rule.name));
        output.push_str(&Self::field("Voting", &rule.voting_configuration.to_string()));
        output.push_str(&Self::field("Result", &Self::result_label(rule)));
        output.push_str(&format!(
            "\n{}\n{}\n",
            "Description:".cyan().bold(),
            Self::indent(&rule.description, "  ")
        ));
        output
    }

    pub fn format_configurations(configs: &[VotingConfiguration]) -> String {
        if configs.is_empty() {
            return format!("{}\n", "No voting configurations.".dimmed());
        }

        let mut output = format!(
            "{}\n",
            format!(
                "{:>6}  {:<22} {:<12} {:<12} {:>4}  {:<6}",
                "ID", "THRESHOLD", "BEGIN", "END", "VER", "STATUS"
            )
            .bold()
        );
        for config in configs {
            output.push_str(&format!(
                "{:>6}  {:<22} {:<12} {:<12} {:>4}  {}\n",
                config.id,
                config.threshold().to_string(),
                config.begin_date.format("%Y-%m-%d").to_string(),
                config.end_date.format("%Y-%m-%d").to_string(),
                config.version,
                Self::status_label(config)
            ));
        }
        output
    }

    pub fn format_configuration(config: &VotingConfiguration) -> String {
        let mut output = Self::header(&format!("Voting configuration {}", config.id));
        output.push_str(&Self::field("Threshold", &config.threshold().description()));
        let window = format!(
            "{} .. {}",
            config.begin_date.to_rfc3339(),
            config.end_date.to_rfc3339()
        );
        output.push_str(&Self::field("Window", &window));
        if let Some(creator) = config.created_by {
            output.push_str(&Self::field("Created by", &format!("member {}", creator)));
        }
        output.push_str(&Self::field("Version", &config.version.to_string()));
        output.push_str(&Self::field("Status", &Self::status_label(config)));
        output
    }

    /// Ballots of one rule followed by their tally
    pub fn format_ballots(tally: &Tally, ballots: &[Ballot]) -> String {
        let mut output = String::new();
        if ballots.is_empty() {
            output.push_str(&format!("{}\n", "No ballots.".dimmed()));
        } else {
            output.push_str(&format!(
                "{}\n",
                format!("{:>6}  {:>8}  {:<6}", "ID", "MEMBER", "ANSWER").bold()
            ));
            for ballot in ballots {
                output.push_str(&format!(
                    "{:>6}  {:>8}  {}\n",
                    ballot.id,
                    ballot.member,
                    Self::answer_label(ballot.answer)
                ));
            }
        }
        output.push('\n');
        output.push_str(&Self::tally_line(tally));
        output
    }

    pub fn format_ballot(ballot: &Ballot) -> String {
        format!(
            "Ballot {} on rule {}: member {} voted {}\n",
            ballot.id,
            ballot.annotation_rule,
            ballot.member,
            Self::answer_label(ballot.answer)
        )
    }

    pub fn format_unvoted(unvoted: &UnvotedRules) -> String {
        if unvoted.total_unvoted_rules == 0 {
            return format!("{}\n", "Nothing left to vote on.".green());
        }

        let mut output = format!(
            "{} {} in {} open voting round(s)\n\n",
            unvoted.total_unvoted_rules.to_string().yellow().bold(),
            if unvoted.total_unvoted_rules == 1 {
                "rule awaits your vote"
            } else {
                "rules await your vote"
            },
            unvoted.active_votings.len()
        );
        for config in &unvoted.active_votings {
            let rules: Vec<_> = unvoted
                .rules
                .iter()
                .filter(|r| r.voting_configuration == config.id)
                .collect();
            if rules.is_empty() {
                continue;
            }
            output.push_str(&format!(
                "{} (ends {})\n",
                format!("── Voting {} ──", config.id).yellow().bold(),
                config.end_date.format("%Y-%m-%d %H:%M")
            ));
            for rule in rules {
                output.push_str(&format!("  {:>6}  {}\n", rule.id, rule.name));
            }
        }
        output
    }

    pub fn format_finalization(report: &FinalizationReport) -> String {
        let mut output = Self::header(&format!("Rule {}: {}", report.rule.id, report.rule.name));
        output.push_str(&Self::tally_line(&report.tally));
        let note = if report.newly_finalized {
            "recorded"
        } else {
            "already finalized"
        };
        output.push_str(&format!(
            "{} {} ({})\n",
            "Outcome:".cyan().bold(),
            Self::outcome_label(report.result),
            note.dimmed()
        ));
        output
    }

    pub fn format_sweep(report: &SweepReport) -> String {
        let mut output = Self::header("Sweep results");
        output.push_str(&Self::field(
            "Closed",
            &Self::join_ids(report.closed.iter().map(|id| id.to_string())),
        ));
        if report.finalized.is_empty() {
            output.push_str(&Self::field("Finalized", "none"));
        } else {
            output.push_str(&format!("{}\n", "Finalized:".cyan().bold()));
            for (rule, result) in &report.finalized {
                output.push_str(&format!(
                    "  rule {:>6}  {}\n",
                    rule,
                    Self::outcome_label(*result)
                ));
            }
        }
        if !report.failures.is_empty() {
            output.push_str(&format!("\n{}\n", "Failures:".red().bold()));
            for failure in &report.failures {
                output.push_str(&format!(
                    "  {} {}: {}\n",
                    "x".red(),
                    failure.target,
                    failure.error.user_message()
                ));
            }
        }
        output
    }

    pub fn format_deleted(what: &str, id: impl std::fmt::Display) -> String {
        format!("{} {} {}\n", "Deleted".green(), what, id)
    }

    /// Format any serializable entity as JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_ballots_json(tally: &Tally, ballots: &[Ballot]) -> String {
        Self::format_json(&json!({
            "ballots": ballots,
            "tally": tally,
        }))
    }

    pub fn format_finalization_json(report: &FinalizationReport) -> String {
        Self::format_json(&json!({
            "rule": report.rule,
            "tally": report.tally,
            "final_result": report.result,
            "newly_finalized": report.newly_finalized,
        }))
    }

    pub fn format_sweep_json(report: &SweepReport) -> String {
        let finalized: Vec<_> = report
            .finalized
            .iter()
            .map(|(rule, result)| json!({"rule": rule, "final_result": result}))
            .collect();
        let failures: Vec<_> = report
            .failures
            .iter()
            .map(|f| {
                json!({
                    "target": f.target.to_string(),
                    "kind": f.error.kind().as_str(),
                    "message": f.error.to_string(),
                })
            })
            .collect();
        Self::format_json(&json!({
            "closed": report.closed,
            "finalized": finalized,
            "failures": failures,
        }))
    }

    fn tally_line(tally: &Tally) -> String {
        format!(
            "{} {} {} yes / {} no ({:.1}% of {})\n",
            "Tally:".cyan().bold(),
            tally.vote_summary(),
            tally.yes_count,
            tally.no_count,
            tally.percentage(),
            tally.total
        )
    }

    fn result_label(rule: &AnnotationRule) -> String {
        match rule.final_result {
            Some(result) if rule.is_finalized => Self::outcome_label(result),
            _ => "pending".dimmed().to_string(),
        }
    }

    fn outcome_label(result: FinalResult) -> String {
        match result {
            FinalResult::Approved => result.as_str().green().bold().to_string(),
            FinalResult::Rejected => result.as_str().red().bold().to_string(),
        }
    }

    fn status_label(config: &VotingConfiguration) -> String {
        if config.is_closed {
            "closed".red().to_string()
        } else {
            "open".green().to_string()
        }
    }

    fn answer_label(answer: bool) -> String {
        if answer {
            "yes".green().to_string()
        } else {
            "no".red().to_string()
        }
    }

    fn join_ids(ids: impl Iterator<Item = String>) -> String {
        let joined = ids.collect::<Vec<_>>().join(", ");
        if joined.is_empty() {
            "none".to_string()
        } else {
            joined
        }
    }

    fn header(title: &str) -> String {
        format!("{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn field(label: &str, value: &str) -> String {
        let label = format!("{:<14}", format!("{}:", label));
        format!("{}{}\n", label.cyan().bold(), value)
    }

    fn truncate(text: &str, width: usize) -> String {
        if text.chars().count() <= width {
            text.to_string()
        } else {
            let cut: String = text.chars().take(width.saturating_sub(1)).collect();
            format!("{}…", cut)
        }
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use consensus_application::{SweepFailure, SweepTarget, VotingError};
    use consensus_domain::{
        BallotId, ConfigurationId, DomainError, MemberId, ProjectId, RuleId,
    };

    fn plain() {
        colored::control::set_override(false);
    }

    fn rule(id: u64, finalized: Option<FinalResult>) -> AnnotationRule {
        let mut rule = AnnotationRule::create(
            ProjectId::new(1),
            format!("R{}", id),
            "Label persons only",
            ConfigurationId::new(5),
        )
        .unwrap();
        rule.id = RuleId::new(id);
        match finalized {
            Some(result) => rule.with_outcome(result),
            None => rule,
        }
    }

    fn ballot(id: u64, member: u64, answer: bool) -> Ballot {
        Ballot {
            id: BallotId::new(id),
            annotation_rule: RuleId::new(7),
            member: MemberId::new(member),
            answer,
        }
    }

    #[test]
    fn test_format_rules() {
        plain();
        let output = ConsoleFormatter::format_rules(&[
            rule(7, None),
            rule(8, Some(FinalResult::Approved)),
        ]);
        assert!(output.contains("NAME"));
        assert!(output.contains("R7"));
        assert!(output.contains("pending"));
        assert!(output.contains("approved"));
        assert!(ConsoleFormatter::format_rules(&[]).contains("No annotation rules"));
    }

    #[test]
    fn test_format_ballots_with_tally() {
        plain();
        let ballots = vec![ballot(1, 10, true), ballot(2, 11, false)];
        let tally = Tally::from_ballots(RuleId::new(7), ballots.clone());
        let output = ConsoleFormatter::format_ballots(&tally, &ballots);
        assert!(output.contains("[●○]"));
        assert!(output.contains("1 yes / 1 no (50.0% of 2)"));
    }

    #[test]
    fn test_format_configuration() {
        plain();
        let mut config = VotingConfiguration::create(
            ProjectId::new(1),
            2,
            50.0,
            Some(MemberId::new(3)),
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap(),
        )
        .unwrap();
        config.id = ConfigurationId::new(5);

        let table = ConsoleFormatter::format_configurations(std::slice::from_ref(&config));
        assert!(table.contains("2026-03-10"));
        assert!(table.contains("open"));

        let detail = ConsoleFormatter::format_configuration(&config);
        assert!(detail.contains("member 3"));
        assert!(detail.contains("Version"));
    }

    #[test]
    fn test_format_sweep() {
        plain();
        let report = SweepReport {
            closed: vec![ConfigurationId::new(5)],
            finalized: vec![(RuleId::new(7), FinalResult::Rejected)],
            failures: vec![SweepFailure {
                target: SweepTarget::Rule(RuleId::new(8)),
                error: VotingError::from(DomainError::invalid_state("boom")),
            }],
        };
        let output = ConsoleFormatter::format_sweep(&report);
        assert!(output.contains("Closed:"));
        assert!(output.contains("rejected"));
        assert!(output.contains("rule 8"));

        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_sweep_json(&report)).unwrap();
        assert_eq!(json["closed"], json!([5]));
        assert_eq!(json["finalized"][0]["final_result"], "rejected");
        assert_eq!(json["failures"][0]["kind"], "invalid_state");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(ConsoleFormatter::truncate("short", 10), "short");
        assert_eq!(ConsoleFormatter::truncate("abcdefghij", 5), "abcd…");
    }
}
