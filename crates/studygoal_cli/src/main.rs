//! StudyGoal command-line front end.
//!
//! # Responsibility
//! - Drive the core data store against the local SQLite replica.
//! - Render store snapshots and errors as plain text.
//!
//! # Invariants
//! - Every invocation loads the store before issuing any mutation.
//! - A failed load aborts the command instead of writing over the replica.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use studygoal_core::{
    init_logging, DataStore, Goal, GoalPatch, NewGoal, SqliteKeyValueStore, StoreConfig,
    StoreSnapshot, UserIdentity,
};

#[derive(Parser)]
#[command(name = "studygoal")]
#[command(about = "Track study goals per subject")]
#[command(version)]
struct Cli {
    /// SQLite replica file
    #[arg(long, env = "STUDYGOAL_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Scope stored data to this signed-in user id
    #[arg(long)]
    user: Option<String>,

    /// Name shown in the status header for `--user`
    #[arg(long, requires = "user")]
    display_name: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "STUDYGOAL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr otherwise
    #[arg(long, env = "STUDYGOAL_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage subjects
    #[command(subcommand)]
    Subject(SubjectCommand),
    /// Manage goals
    #[command(subcommand)]
    Goal(GoalCommand),
    /// Show collection counts and goals whose subject is gone
    Status,
}

#[derive(Subcommand)]
enum SubjectCommand {
    Add { name: String },
    List,
    Delete { id: String },
}

#[derive(Subcommand)]
enum GoalCommand {
    Add(GoalAddArgs),
    List {
        /// Only goals referring to this subject name
        #[arg(long)]
        subject: Option<String>,
    },
    Toggle { id: String },
    Update(GoalUpdateArgs),
    Delete { id: String },
}

#[derive(Args)]
struct GoalAddArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
struct GoalUpdateArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let user = signed_in_user(&cli);
    let config = resolve_config(&cli, user.as_ref());
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    let kv = SqliteKeyValueStore::open(&config.db_path)
        .with_context(|| format!("failed to open replica `{}`", config.db_path.display()))?;
    let store = DataStore::with_keys(Arc::new(kv), config.keys());
    let report = store
        .load()
        .await
        .context("failed to load stored subjects and goals")?;
    info!(
        "event=cli_start module=cli status=ok subjects={} goals={}",
        report.subjects, report.goals
    );

    run(&store, user.as_ref(), cli.command).await
}

fn signed_in_user(cli: &Cli) -> Option<UserIdentity> {
    let uid = cli.user.as_deref().map(str::trim).filter(|uid| !uid.is_empty())?;
    Some(UserIdentity::new(uid, cli.display_name.clone()))
}

fn resolve_config(cli: &Cli, user: Option<&UserIdentity>) -> StoreConfig {
    let mut config = StoreConfig::from_env();
    if let Some(path) = cli.db_path.clone() {
        config.db_path = path;
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir.clone() {
        config.log_dir = Some(dir);
    }
    match user {
        Some(identity) => config.with_user(identity),
        None => config,
    }
}

async fn run(store: &DataStore, user: Option<&UserIdentity>, command: Commands) -> Result<()> {
    match command {
        Commands::Subject(SubjectCommand::Add { name }) => {
            let subject = store.add_subject(&name).await?;
            println!("added subject {} ({})", subject.name, subject.id);
        }
        Commands::Subject(SubjectCommand::List) => {
            let subjects = store.subjects();
            if subjects.is_empty() {
                println!("No subjects added yet.");
            }
            for (index, subject) in subjects.iter().enumerate() {
                println!("{}. {} ({})", index + 1, subject.name, subject.id);
            }
        }
        Commands::Subject(SubjectCommand::Delete { id }) => {
            store.delete_subject(&id).await?;
            println!("deleted subject {id}");
        }
        Commands::Goal(GoalCommand::Add(args)) => {
            let mut input = NewGoal::new(args.title, args.subject);
            input.description = args.description;
            let goal = store.add_goal(input).await?;
            println!("added goal {}", goal.id);
            print_goal(&goal);
        }
        Commands::Goal(GoalCommand::List { subject }) => {
            let goals = match subject.as_deref() {
                Some(name) => store.goals_for_subject(name),
                None => store.goals(),
            };
            if goals.is_empty() {
                println!("No goals added yet.");
            }
            goals.iter().for_each(print_goal);
        }
        Commands::Goal(GoalCommand::Toggle { id }) => {
            print_goal(&store.toggle_goal_completion(&id).await?);
        }
        Commands::Goal(GoalCommand::Update(args)) => {
            let patch = GoalPatch {
                title: args.title,
                subject: args.subject,
                description: args.description,
            };
            if patch.is_empty() {
                bail!("nothing to update; pass --title, --subject or --description");
            }
            print_goal(&store.update_goal(&args.id, patch).await?);
        }
        Commands::Goal(GoalCommand::Delete { id }) => {
            store.delete_goal(&id).await?;
            println!("deleted goal {id}");
        }
        Commands::Status => {
            if let Some(identity) = user {
                println!("Welcome, {}!", identity.greeting_name());
            }
            print_status(&store.snapshot(), &store.orphaned_goals());
        }
    }
    Ok(())
}

fn print_goal(goal: &Goal) {
    let mark = if goal.completed { "x" } else { " " };
    println!("[{mark}] {} ({})", goal.title, goal.id);
    println!("    Subject: {}", goal.subject);
    if !goal.description.is_empty() {
        println!("    Description: {}", goal.description);
    }
    println!("    Created: {}", goal.date);
}

fn print_status(snapshot: &StoreSnapshot, orphaned: &[Goal]) {
    let done = snapshot.goals.iter().filter(|goal| goal.completed).count();
    println!("subjects: {}", snapshot.subjects.len());
    println!("goals: {} ({done} completed)", snapshot.goals.len());
    if !orphaned.is_empty() {
        println!("goals without a matching subject:");
        orphaned.iter().for_each(print_goal);
    }
}
