//! CLI command definitions for task-rollup.
//!
//! This module defines the CLI structure using clap's derive macros. Each
//! subcommand maps onto one lifecycle operation or one read of the
//! progression view.

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for read commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

/// Hierarchical task tracking with progress rollup
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a task, optionally as a subtask of an existing task
    Create {
        /// Group the task belongs to
        #[arg(long)]
        group: String,

        /// Actor creating the task
        #[arg(long)]
        actor: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Free-text description
        #[arg(long)]
        description: Option<String>,

        /// Parent task id
        #[arg(long)]
        parent: Option<String>,

        /// Assign the task on creation
        #[arg(long)]
        assignee: Option<String>,
    },

    /// Edit an existing task; omitted fields stay unchanged
    Edit {
        /// Task id
        id: String,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        /// New parent task id
        #[arg(long, conflicts_with = "detach")]
        parent: Option<String>,

        /// Turn the task into a root task
        #[arg(long)]
        detach: bool,

        /// New assignee
        #[arg(long, conflicts_with = "unassign")]
        assignee: Option<String>,

        /// Remove the assignee
        #[arg(long)]
        unassign: bool,

        /// New status: created, doing, done, or closed
        #[arg(long)]
        status: Option<String>,
    },

    /// Claim a task: sets the assignee and moves it to doing
    Accept {
        /// Task id
        id: String,

        /// Actor claiming the task
        #[arg(long)]
        actor: String,
    },

    /// Complete a task and cascade completion through its subtree
    Done {
        /// Task id
        id: String,

        /// Actor completing the task (must be the assignee)
        #[arg(long)]
        actor: String,
    },

    /// Render a group's task tree with progress bars
    Progress {
        /// Group to render
        #[arg(long)]
        group: String,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List tasks of a group, or the open claims of an actor
    List {
        /// Group to list
        #[arg(long, conflicts_with = "assignee")]
        group: Option<String>,

        /// List open tasks assigned to this actor instead
        #[arg(long)]
        assignee: Option<String>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}
