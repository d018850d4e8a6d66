//! CLI entrypoint for rule-consensus
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use consensus_application::{
    AnnotationRuleService, BallotService, FinalizeRuleUseCase, NoProgress, Repositories,
    SweepExpiredVotingsUseCase, SweepProgress, VotingConfigurationService, VotingError,
};
use consensus_domain::{
    AnnotationRulePatch, BallotPatch, MemberId, ProjectId, Tally, VotingConfigurationPatch,
};
use consensus_infrastructure::{
    ApiClient, ConfigLoader, FileConfig, FileOutputFormat, api_repositories,
};
use consensus_presentation::{
    BallotCommand, Cli, Command, ConsoleFormatter, OutputFormat, ProgressReporter, RuleCommand,
    SimpleProgress, VotingCommand, cli::commands::MemberArg,
};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), describe(&err));
            ExitCode::FAILURE
        }
    }
}

/// Voting failures carry their own user-facing text; everything else is
/// printed with its context chain.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<VotingError>() {
        Some(voting) => voting.user_message(),
        None => format!("{:#}", err),
    }
}

/// Everything a command needs, resolved once at startup
struct Session {
    project: ProjectId,
    default_member: Option<MemberId>,
    format: OutputFormat,
    quiet: bool,
    repos: Repositories,
}

impl Session {
    fn member(&self, arg: &MemberArg) -> Result<MemberId> {
        arg.member.or(self.default_member).context(
            "No member selected. Pass --member <ID> or set project.member in the config.",
        )
    }

    fn emit(&self, table: impl FnOnce() -> String, json: impl FnOnce() -> String) {
        match self.format {
            OutputFormat::Table => print!("{}", table()),
            OutputFormat::Json => println!("{}", json()),
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let config: FileConfig = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let issues = config.validate();
    if !issues.is_empty() {
        let details: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
        bail!("Invalid configuration: {}", details.join("; "));
    }

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let Some(command) = cli.command else {
        bail!("No command given. Run with --help for usage.");
    };

    let project = cli.project.or(config.project.id).context(
        "No project selected. Pass --project <ID> or set project.id in the config.",
    )?;
    let format = cli.output.unwrap_or(match config.output.format {
        FileOutputFormat::Table => OutputFormat::Table,
        FileOutputFormat::Json => OutputFormat::Json,
    });

    // === Dependency Injection ===
    let client = ApiClient::from_config(&config.api)?;
    info!(
        "Using backend {} (timeout {}s) for project {}",
        client.base_url(),
        config.api.timeout_seconds,
        project
    );

    let session = Session {
        project,
        default_member: config.project.member,
        format,
        quiet: cli.quiet,
        repos: api_repositories(client),
    };

    match command {
        Command::Rules { action } => run_rules(&session, action).await,
        Command::Votings { action } => run_votings(&session, action).await,
        Command::Ballots { action } => run_ballots(&session, action).await,
        Command::Finalize { rule } => {
            let use_case = FinalizeRuleUseCase::new(session.repos.clone());
            let report = use_case.execute(session.project, rule).await?;
            session.emit(
                || ConsoleFormatter::format_finalization(&report),
                || ConsoleFormatter::format_finalization_json(&report),
            );
            Ok(())
        }
        Command::Sweep { now } => {
            let now = now.unwrap_or_else(Utc::now);
            debug!("Sweeping with reference time {}", now.to_rfc3339());

            let use_case = SweepExpiredVotingsUseCase::new(session.repos.clone());
            let progress: Box<dyn SweepProgress> =
                if session.quiet || session.format == OutputFormat::Json {
                    Box::new(NoProgress)
                } else if std::io::stderr().is_terminal() {
                    Box::new(ProgressReporter::new())
                } else {
                    Box::new(SimpleProgress)
                };
            let report = use_case
                .execute_with_progress(session.project, now, progress.as_ref())
                .await?;
            session.emit(
                || ConsoleFormatter::format_sweep(&report),
                || ConsoleFormatter::format_sweep_json(&report),
            );
            if report.is_clean() {
                Ok(())
            } else {
                bail!("{} sweep step(s) failed", report.failures.len())
            }
        }
    }
}

async fn run_rules(session: &Session, action: RuleCommand) -> Result<()> {
    let service = AnnotationRuleService::new(session.repos.clone());
    let project = session.project;

    match action {
        RuleCommand::List => {
            let rules = service.list(project).await?;
            session.emit(
                || ConsoleFormatter::format_rules(&rules),
                || ConsoleFormatter::format_json(&rules),
            );
        }
        RuleCommand::Show { id } => {
            let rule = service.find_by_id(project, id).await?;
            session.emit(
                || ConsoleFormatter::format_rule(&rule),
                || ConsoleFormatter::format_json(&rule),
            );
        }
        RuleCommand::Create {
            name,
            description,
            voting,
        } => {
            let rule = service.create(project, name, description, voting).await?;
            session.emit(
                || ConsoleFormatter::format_rule(&rule),
                || ConsoleFormatter::format_json(&rule),
            );
        }
        RuleCommand::Update {
            id,
            name,
            description,
            voting,
        } => {
            let patch = AnnotationRulePatch {
                name,
                description,
                voting_configuration: voting,
            };
            let rule = service.update(project, id, &patch).await?;
            session.emit(
                || ConsoleFormatter::format_rule(&rule),
                || ConsoleFormatter::format_json(&rule),
            );
        }
        RuleCommand::Delete { id } => {
            let rule = service.delete(project, id).await?;
            session.emit(
                || ConsoleFormatter::format_deleted("annotation rule", rule.id),
                || ConsoleFormatter::format_json(&rule),
            );
        }
        RuleCommand::Unvoted { member } => {
            let member = session.member(&member)?;
            let unvoted = service.list_unvoted(project, member).await?;
            session.emit(
                || ConsoleFormatter::format_unvoted(&unvoted),
                || ConsoleFormatter::format_json(&unvoted),
            );
        }
    }
    Ok(())
}

async fn run_votings(session: &Session, action: VotingCommand) -> Result<()> {
    let service = VotingConfigurationService::new(session.repos.clone());
    let project = session.project;

    let config = match action {
        VotingCommand::List => {
            let configs = service.list(project).await?;
            session.emit(
                || ConsoleFormatter::format_configurations(&configs),
                || ConsoleFormatter::format_json(&configs),
            );
            return Ok(());
        }
        VotingCommand::Show { id } => service.find_by_id(project, id).await?,
        VotingCommand::Create {
            threshold,
            begin,
            end,
            created_by,
        } => {
            service
                .create(
                    project,
                    threshold.min_approvals,
                    threshold.min_percentage,
                    created_by,
                    begin,
                    end,
                )
                .await?
        }
        VotingCommand::Update {
            id,
            base_version,
            min_approvals,
            min_percentage,
            begin,
            end,
        } => {
            let patch = VotingConfigurationPatch {
                voting_threshold: min_approvals,
                percentage_threshold: min_percentage,
                begin_date: begin,
                end_date: end,
                ..VotingConfigurationPatch::default()
            };
            service.update(project, id, base_version, &patch).await?
        }
        VotingCommand::Close { id, base_version } => {
            let base_version = match base_version {
                Some(version) => version,
                None => service.find_by_id(project, id).await?.version,
            };
            service.close(project, id, base_version).await?
        }
    };

    session.emit(
        || ConsoleFormatter::format_configuration(&config),
        || ConsoleFormatter::format_json(&config),
    );
    Ok(())
}

async fn run_ballots(session: &Session, action: BallotCommand) -> Result<()> {
    let service = BallotService::new(session.repos.clone());
    let project = session.project;

    match action {
        BallotCommand::List { rule } => {
            let ballots = service.list(project, rule).await?;
            let tally = Tally::from_ballots(rule, ballots.iter().cloned());
            session.emit(
                || ConsoleFormatter::format_ballots(&tally, &ballots),
                || ConsoleFormatter::format_ballots_json(&tally, &ballots),
            );
        }
        BallotCommand::Show { id } => {
            let ballot = service.find_by_id(project, id).await?;
            session.emit(
                || ConsoleFormatter::format_ballot(&ballot),
                || ConsoleFormatter::format_json(&ballot),
            );
        }
        BallotCommand::Cast {
            rule,
            answer,
            member,
        } => {
            let member = session.member(&member)?;
            let ballot = service
                .save(project, rule, member, answer.as_bool())
                .await?;
            session.emit(
                || ConsoleFormatter::format_ballot(&ballot),
                || ConsoleFormatter::format_json(&ballot),
            );
        }
        BallotCommand::Update { id, answer } => {
            let ballot = service
                .update(project, id, &BallotPatch::answer(answer.as_bool()))
                .await?;
            session.emit(
                || ConsoleFormatter::format_ballot(&ballot),
                || ConsoleFormatter::format_json(&ballot),
            );
        }
        BallotCommand::Delete { id } => {
            service.delete(project, id).await?;
            session.emit(
                || ConsoleFormatter::format_deleted("ballot", id),
                || serde_json::json!({ "deleted": id }).to_string(),
            );
        }
    }
    Ok(())
}
