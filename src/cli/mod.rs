//! Command-line interface.

pub mod completions;
pub mod context;
pub mod output;
pub mod passwd;
pub mod publish;
pub mod serve;
pub mod snapshot;
pub mod variables;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

/// envdeck - Local encrypted environment variables with drafts and reloads.
#[derive(Parser)]
#[command(
    name = "envdeck",
    about = "Local encrypted environment variables with drafts, versions and reload notifications",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Branch to read and write (defaults to the git branch)
    #[arg(short, long, global = true, env = "ENVDECK_BRANCH")]
    pub branch: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Set a variable
    Set {
        /// Variable name (e.g., DATABASE_URL)
        key: String,
        /// Value
        value: String,
        /// Store the value encrypted
        #[arg(short, long, conflicts_with = "plain")]
        sensitive: bool,
        /// Store the value in plaintext, even if it was sensitive
        #[arg(long)]
        plain: bool,
        /// Category
        #[arg(short, long)]
        category: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Print a variable's value
    Get {
        /// Variable name
        key: String,
    },

    /// Remove a variable
    Rm {
        /// Variable name
        key: String,
    },

    /// List variables
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Show sensitive values
        #[arg(long)]
        reveal: bool,
    },

    /// Show change history
    History {
        /// Only this variable
        key: Option<String>,
        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Manage snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },

    /// Apply several changes as one version
    Publish {
        /// Assignments to apply
        #[arg(value_name = "KEY=VALUE")]
        assignments: Vec<String>,
        /// Variables to delete
        #[arg(short, long = "delete", value_name = "KEY")]
        delete: Vec<String>,
        /// Version description
        #[arg(short, long)]
        message: Option<String>,
        /// Store new values encrypted
        #[arg(short, long)]
        sensitive: bool,
    },

    /// List published versions
    Versions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the store password
    Passwd,

    /// Run the change notifier until interrupted
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Snapshot subcommands.
#[derive(Subcommand)]
pub enum SnapshotAction {
    /// Capture the current variables
    Create {
        /// Snapshot name
        name: String,
        /// Description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// List snapshots
    List,

    /// Restore a snapshot (a backup of the current state is taken first)
    Restore {
        /// Snapshot id
        id: String,
    },

    /// Delete a snapshot
    Rm {
        /// Snapshot id
        id: String,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a parsed command line.
pub fn execute(cli: Cli) -> Result<()> {
    use Command::*;

    let scope = context::Scope {
        project: cli.project,
        branch: cli.branch,
    };

    match cli.command {
        Set {
            key,
            value,
            sensitive,
            plain,
            category,
            description,
        } => {
            let sensitive = match (sensitive, plain) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            variables::set(&scope, &key, &value, sensitive, category, description)
        }
        Get { key } => variables::get(&scope, &key),
        Rm { key } => variables::rm(&scope, &key),
        List { json, reveal } => variables::list(&scope, json, reveal),
        History { key, limit } => variables::history(&scope, key, limit),
        Snapshot { action } => match action {
            SnapshotAction::Create { name, description } => {
                snapshot::create(&scope, &name, &description)
            }
            SnapshotAction::List => snapshot::list(&scope),
            SnapshotAction::Restore { id } => snapshot::restore(&scope, &id),
            SnapshotAction::Rm { id } => snapshot::rm(&scope, &id),
        },
        Publish {
            assignments,
            delete,
            message,
            sensitive,
        } => publish::execute(&scope, &assignments, &delete, message, sensitive),
        Versions { json } => publish::versions(&scope, json),
        Passwd => passwd::execute(&scope),
        Serve { port } => serve::execute(port),
        Completions { shell } => completions::execute(shell),
    }
}
