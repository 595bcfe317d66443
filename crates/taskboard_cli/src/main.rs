//! `taskboard` command-line entry point.
//!
//! # Responsibility
//! - Load configuration, start logging and open the database.
//! - Resolve the acting user and dispatch one core operation per call.
//! - Print read projections as JSON on stdout.

mod commands;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;
use taskboard_core::{CoreConfig, ErrorKind, ServiceError, SprintStatus};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "taskboard", version, about = "Project boards with sprints and members")]
struct Cli {
    /// SQLite database file; overrides TASKBOARD_DATABASE_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Username the command runs as
    #[arg(long = "as", value_name = "USERNAME", global = true)]
    acting_as: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register and look up users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Create and manage owned projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },
    /// Invitations and project membership
    Member {
        #[command(subcommand)]
        action: MemberAction,
    },
    /// Sprint planning and task assignment
    Sprint {
        #[command(subcommand)]
        action: SprintAction,
    },
    /// Project backlog tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// List task priority levels
    Priorities,
}

#[derive(Subcommand)]
enum UserAction {
    Register {
        username: String,
        #[arg(long)]
        email: Option<String>,
    },
    Show {
        username: String,
    },
}

#[derive(Subcommand)]
enum ProjectAction {
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Projects owned by the acting user
    List,
    Show {
        project: Uuid,
    },
    Update {
        project: Uuid,
        #[arg(long)]
        name: Option<String>,
        /// Empty string clears the description
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        project: Uuid,
    },
}

#[derive(Subcommand)]
enum MemberAction {
    /// Invite a user (owner only)
    Add { project: Uuid, username: String },
    /// Remove a member or withdraw an invite (owner only)
    Remove { project: Uuid, username: String },
    List { project: Uuid },
    /// Accept or decline a pending invite
    Decide {
        project: Uuid,
        #[arg(long, action = clap::ArgAction::Set)]
        accept: bool,
    },
    Leave { project: Uuid },
    /// Projects the acting user has joined
    Projects,
    /// Invites awaiting the acting user's decision
    Invites,
}

#[derive(Subcommand)]
enum SprintAction {
    Create {
        project: Uuid,
        name: String,
        #[command(flatten)]
        dates: SprintDates,
    },
    Show {
        sprint: Uuid,
    },
    List {
        project: Uuid,
    },
    Update {
        sprint: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// open | closed
        #[arg(long, value_parser = parse_sprint_status)]
        status: Option<SprintStatus>,
    },
    /// Delete a sprint; its tasks return to the backlog
    Delete {
        sprint: Uuid,
    },
    Assign {
        task: Uuid,
        sprint: Uuid,
    },
    Unassign {
        task: Uuid,
    },
    /// Burndown series of a sprint
    Chart {
        sprint: Uuid,
    },
}

#[derive(Args)]
struct SprintDates {
    /// First day, YYYY-MM-DD
    #[arg(long)]
    start: NaiveDate,
    /// Last day, YYYY-MM-DD
    #[arg(long)]
    end: NaiveDate,
}

#[derive(Subcommand)]
enum TaskAction {
    Create {
        project: Uuid,
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value_t = 2)]
        priority: i64,
    },
    List {
        project: Uuid,
    },
    Show {
        task: Uuid,
    },
    Update {
        task: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<i64>,
    },
    /// Mark done; defaults to now (UTC)
    Finish {
        task: Uuid,
        /// YYYY-MM-DDTHH:MM:SS
        #[arg(long)]
        at: Option<NaiveDateTime>,
    },
    Reopen {
        task: Uuid,
    },
    Delete {
        task: Uuid,
    },
}

fn parse_sprint_status(value: &str) -> Result<SprintStatus, String> {
    SprintStatus::parse(value).ok_or_else(|| format!("unknown sprint status `{value}`"))
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(
                "event=cli_command module=cli status=error error={}",
                format!("{err:#}").replace('\n', " ")
            );
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = CoreConfig::from_env().context("invalid TASKBOARD_* environment")?;
    if let Some(path) = cli.db {
        config.database_path = path;
    }
    config.init_logging().context("failed to start logging")?;

    let conn = taskboard_core::db::open_db(&config.database_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.database_path.display()
        )
    })?;
    let session = commands::Session::new(&conn, cli.acting_as);

    match cli.command {
        Command::User { action } => commands::user(&session, action),
        Command::Project { action } => commands::project(&session, action),
        Command::Member { action } => commands::member(&session, action),
        Command::Sprint { action } => commands::sprint(&session, action),
        Command::Task { action } => commands::task(&session, action),
        Command::Priorities => commands::priorities(&session),
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<ServiceError>().map(ServiceError::kind) {
        Some(ErrorKind::Forbidden) => 3,
        Some(ErrorKind::NotFound) => 4,
        Some(ErrorKind::Conflict) => 5,
        Some(ErrorKind::InvalidInput) => 2,
        Some(ErrorKind::Internal) | None => 1,
    }
}
