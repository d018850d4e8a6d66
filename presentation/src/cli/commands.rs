//! CLI command definitions

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use consensus_domain::{BallotId, ConfigurationId, MemberId, ProjectId, RuleId};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// JSON output
    Json,
}

/// A yes/no ballot answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn as_bool(self) -> bool {
        matches!(self, Answer::Yes)
    }
}

/// CLI arguments for rule-consensus
#[derive(Parser, Debug)]
#[command(name = "rule-consensus")]
#[command(author, version, about = "Vote on annotation rules and finalize their outcome")]
#[command(long_about = r#"
rule-consensus talks to the annotation platform backend to manage rule voting.

A project admin opens a voting round (voting configuration) with an approval
threshold, attaches annotation rules to it, and members vote yes or no on each
rule. Once the round closes, the ballots are tallied and every rule is
finalized as approved or rejected.

Configuration files are loaded from (in priority order):
1. CONSENSUS_* environment variables (e.g. CONSENSUS_API__BASE_URL)
2. --config <path>      Explicit config file
3. ./consensus.toml     Project-level config
4. ~/.config/rule-consensus/config.toml   Global config

Example:
  rule-consensus -p 4 votings create --min-approvals 2 --min-percentage 50 \
      --begin 2026-03-01T00:00:00Z --end 2026-03-10T00:00:00Z
  rule-consensus -p 4 rules create --name R1 --description "Tag persons only" --voting 5
  rule-consensus -p 4 ballots cast 7 yes --member 10
  rule-consensus -p 4 sweep
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project to operate on (defaults to project.id from the config)
    #[arg(short, long, global = true, value_name = "ID")]
    pub project: Option<ProjectId>,

    /// Output format (defaults to output.format from the config)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage annotation rules
    Rules {
        #[command(subcommand)]
        action: RuleCommand,
    },
    /// Manage voting rounds
    Votings {
        #[command(subcommand)]
        action: VotingCommand,
    },
    /// Cast and manage ballots
    Ballots {
        #[command(subcommand)]
        action: BallotCommand,
    },
    /// Tally a rule of a closed round and record its outcome
    Finalize {
        rule: RuleId,
    },
    /// Close expired rounds and finalize their rules
    Sweep {
        /// Reference time (RFC 3339); defaults to now
        #[arg(long, value_name = "TIME")]
        now: Option<DateTime<Utc>>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RuleCommand {
    /// List the rules of the project
    List,
    /// Show one rule
    Show { id: RuleId },
    /// Propose a new rule in a voting round
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// Voting configuration the rule is put to vote in
        #[arg(long, value_name = "CONFIG_ID")]
        voting: ConfigurationId,
    },
    /// Edit a rule
    Update {
        id: RuleId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Move the rule to another voting configuration
        #[arg(long, value_name = "CONFIG_ID")]
        voting: Option<ConfigurationId>,
    },
    /// Delete a rule that is not finalized
    Delete { id: RuleId },
    /// Rules in open rounds the member has not voted on
    Unvoted {
        #[command(flatten)]
        member: MemberArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum VotingCommand {
    /// List the voting rounds of the project
    List,
    /// Show one voting round
    Show { id: ConfigurationId },
    /// Open a new voting round
    Create {
        #[command(flatten)]
        threshold: ThresholdArgs,
        #[arg(long, value_name = "TIME")]
        begin: DateTime<Utc>,
        #[arg(long, value_name = "TIME")]
        end: DateTime<Utc>,
        /// Member recorded as the creator
        #[arg(long, value_name = "MEMBER_ID")]
        created_by: Option<MemberId>,
    },
    /// Change thresholds or window of an open round
    Update {
        id: ConfigurationId,
        /// Version the change is based on
        #[arg(long)]
        base_version: u64,
        #[arg(long, value_name = "N")]
        min_approvals: Option<u32>,
        #[arg(long, value_name = "PERCENT")]
        min_percentage: Option<f64>,
        #[arg(long, value_name = "TIME")]
        begin: Option<DateTime<Utc>>,
        #[arg(long, value_name = "TIME")]
        end: Option<DateTime<Utc>>,
    },
    /// Close a round; its rules can then be finalized
    Close {
        id: ConfigurationId,
        /// Version the close is based on (defaults to the stored version)
        #[arg(long)]
        base_version: Option<u64>,
    },
}

#[derive(Args, Debug)]
pub struct ThresholdArgs {
    /// Minimum number of yes ballots
    #[arg(long, value_name = "N")]
    pub min_approvals: u32,
    /// Minimum share of yes ballots, 0-100
    #[arg(long, value_name = "PERCENT")]
    pub min_percentage: f64,
}

#[derive(Subcommand, Debug)]
pub enum BallotCommand {
    /// List the ballots on a rule with their tally
    List { rule: RuleId },
    /// Show one ballot
    Show { id: BallotId },
    /// Vote on a rule; voting again replaces the earlier answer
    Cast {
        rule: RuleId,
        #[arg(value_enum)]
        answer: Answer,
        #[command(flatten)]
        member: MemberArg,
    },
    /// Change the answer of a ballot
    Update {
        id: BallotId,
        #[arg(value_enum)]
        answer: Answer,
    },
    /// Withdraw a ballot while the round is open
    Delete { id: BallotId },
}

#[derive(Args, Debug)]
pub struct MemberArg {
    /// Member id (defaults to project.member from the config)
    #[arg(short, long, value_name = "MEMBER_ID")]
    pub member: Option<MemberId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cast() {
        let cli = Cli::try_parse_from([
            "rule-consensus",
            "-p",
            "4",
            "ballots",
            "cast",
            "7",
            "yes",
            "--member",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.project, Some(ProjectId::new(4)));
        match cli.command {
            Some(Command::Ballots {
                action:
                    BallotCommand::Cast {
                        rule,
                        answer,
                        member,
                    },
            }) => {
                assert_eq!(rule, RuleId::new(7));
                assert!(answer.as_bool());
                assert_eq!(member.member, Some(MemberId::new(10)));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_voting_create() {
        let cli = Cli::try_parse_from([
            "rule-consensus",
            "votings",
            "create",
            "--min-approvals",
            "2",
            "--min-percentage",
            "50",
            "--begin",
            "2026-03-01T00:00:00Z",
            "--end",
            "2026-03-10T00:00:00Z",
            "-o",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(OutputFormat::Json));
        match cli.command {
            Some(Command::Votings {
                action: VotingCommand::Create {
                    threshold, begin, end, ..
                },
            }) => {
                assert_eq!(threshold.min_approvals, 2);
                assert_eq!(threshold.min_percentage, 50.0);
                assert!(begin < end);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verbosity_and_global_flags() {
        let cli = Cli::try_parse_from(["rule-consensus", "sweep", "-vv", "--no-config"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_config);
        assert!(matches!(cli.command, Some(Command::Sweep { now: None })));
    }

    #[test]
    fn test_rejects_bad_id() {
        assert!(Cli::try_parse_from(["rule-consensus", "finalize", "seven"]).is_err());
    }
}
