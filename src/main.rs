//! pinboard-tags: Alfred workflow helper for Pinboard tags
//!
//! Alfred runs this binary from the workflow bundle directory. Script
//! Filter commands answer with Alfred XML on stdout; action commands print
//! a single line that Alfred shows as a notification.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use pinboard_tags::alfred::{Feedback, Workflow};
use pinboard_tags::commands;
use pinboard_tags::config::{self, Config};

/// Environment variable holding the log filter
const LOG_ENV: &str = "PINBOARD_TAGS_LOG";

#[derive(Parser)]
#[command(name = "pinboard-tags")]
#[command(about = "Alfred workflow helper for Pinboard tags", long_about = None)]
#[command(version)]
struct Cli {
    /// Workflow bundle directory containing info.plist (defaults to the current directory)
    #[arg(long, global = true)]
    workflow_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest tags for the typed tag list (Script Filter)
    Tags {
        /// Tags typed so far; the last one is completed
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },

    /// Search cached bookmarks by tag or title (Script Filter)
    Bookmarks {
        /// Words that must match a tag or the title
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        query: Vec<String>,
    },

    /// Refresh the tag cache from Pinboard
    Update {
        /// Download all bookmarks even if the cache looks current
        #[arg(short, long)]
        force: bool,
    },

    /// Store the Pinboard API token (user:TOKEN)
    Auth {
        /// Token from https://pinboard.in/settings/password
        token: String,
    },

    /// Add a bookmark to Pinboard
    Post {
        /// URL to bookmark
        url: String,

        /// Bookmark title (defaults to the URL)
        #[arg(short, long)]
        title: Option<String>,

        /// Tags, space or comma separated
        #[arg(long, num_args = 1..)]
        tags: Vec<String>,

        /// Extended description
        #[arg(short, long)]
        notes: Option<String>,

        /// Make the bookmark private
        #[arg(long)]
        private: bool,

        /// Mark the bookmark as unread
        #[arg(long)]
        toread: bool,
    },

    /// Inspect or change stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print a setting
    Get { key: String },

    /// Change a setting
    Set { key: String, value: String },

    /// Remove a setting
    Unset { key: String },

    /// Print all settings
    List,
}

impl Commands {
    /// Script Filters must always answer with XML, even on failure
    fn is_script_filter(&self) -> bool {
        matches!(self, Self::Tags { .. } | Self::Bookmarks { .. })
    }
}

/// What a command hands back to Alfred
enum Output {
    Feedback(Feedback),
    Message(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let script_filter = cli.command.is_script_filter();

    let workflow = match Workflow::locate(cli.workflow_dir.as_deref()) {
        Ok(workflow) => workflow,
        Err(err) => return report_error(&err, script_filter),
    };

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = init_logging(&workflow.cache_dir);
    tracing::debug!(bundle_id = %workflow.bundle_id, "pinboard-tags starting");

    match run(cli.command, &workflow) {
        Ok(Output::Feedback(mut feedback)) => match feedback.write_to(io::stdout().lock()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::error!("{:#}", err);
                ExitCode::FAILURE
            }
        },
        Ok(Output::Message(message)) => {
            println!("{}", message);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{:#}", err);
            report_error(&err, script_filter)
        }
    }
}

fn run(command: Commands, workflow: &Workflow) -> Result<Output> {
    let output = match command {
        Commands::Tags { query } => {
            let config = commands::utils::load_config(workflow)?;
            Output::Feedback(commands::tags::execute(workflow, &config, &query)?)
        }

        Commands::Bookmarks { query } => {
            let config = commands::utils::load_config(workflow)?;
            Output::Feedback(commands::bookmarks::execute(workflow, &config, &query)?)
        }

        Commands::Update { force } => {
            let config = commands::utils::load_config(workflow)?;
            Output::Message(commands::update::execute(workflow, &config, force)?)
        }

        Commands::Auth { token } => Output::Message(commands::auth::execute(workflow, &token)?),

        Commands::Post {
            url,
            title,
            tags,
            notes,
            private,
            toread,
        } => {
            let config: Config = commands::utils::load_config(workflow)?;
            let options = commands::post::PostOptions {
                url,
                title,
                tags,
                notes,
                private,
                toread,
            };
            Output::Message(commands::post::execute(workflow, &config, &options)?)
        }

        Commands::Settings { action } => {
            let mut settings = workflow.settings()?;
            let message = match action {
                SettingsAction::Get { key } => commands::settings::get(&settings, &key)?,
                SettingsAction::Set { key, value } => {
                    commands::settings::set(&mut settings, &key, &value)?
                }
                SettingsAction::Unset { key } => commands::settings::unset(&mut settings, &key)?,
                SettingsAction::List => commands::settings::list(&settings),
            };
            Output::Message(message)
        }
    };

    Ok(output)
}

/// Report a failure the way Alfred expects it and pick the exit code
fn report_error(err: &anyhow::Error, script_filter: bool) -> ExitCode {
    if script_filter {
        let mut feedback = Feedback::new();
        feedback.make_error(err);
        if let Err(write_err) = feedback.write_to(io::stdout().lock()) {
            eprintln!("Error in generating Alfred output: {:#}", write_err);
        }
    } else {
        println!("Error: {:#}", err);
    }
    ExitCode::FAILURE
}

/// Log to a file in the cache directory (stdout belongs to Alfred)
fn init_logging(log_dir: &Path) -> Option<WorkerGuard> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(config::LOG_FILE)
        .build(log_dir)
        .ok()?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("pinboard_tags=info"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .ok()?;

    Some(guard)
}
