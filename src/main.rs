//! task-rollup CLI
//!
//! Command boundary for the task hierarchy and progress rollup engine:
//! parses arguments, wires configuration, database, and service together,
//! and maps domain errors to terminal output.

use anyhow::{Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use task_rollup::cli::{Cli, Command, OutputFormat};
use task_rollup::config::Config;
use task_rollup::db::Database;
use task_rollup::error::TaskError;
use task_rollup::hierarchy;
use task_rollup::service::LifecycleService;
use task_rollup::types::{CreateTaskInput, EditTaskInput, Task, TaskStatus};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    task_rollup::logging::init(cli.verbose, &cli.log)?;

    let mut config = match &cli.config {
        Some(path) => Config::from_file(Path::new(path))?,
        None => Config::load()?,
    };
    if let Some(db_path) = &cli.database {
        config.db_path = PathBuf::from(db_path);
    }
    debug!(db_path = %config.db_path.display(), "configuration resolved");

    if let Some(dir) = config.db_path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let db = Database::open(&config.db_path)?;
    let service = LifecycleService::new(Arc::new(db));

    if let Err(err) = run(&service, cli.command).await {
        match err.downcast_ref::<TaskError>() {
            Some(task_err) => eprintln!("error: {}", task_err.message),
            None => eprintln!("error: {}", err),
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(service: &LifecycleService, command: Command) -> Result<()> {
    match command {
        Command::Create {
            group,
            actor,
            name,
            description,
            parent,
            assignee,
        } => {
            let task = service
                .create_task(CreateTaskInput {
                    group_id: group,
                    created_by: actor,
                    name,
                    description,
                    parent_id: parent,
                    assignee_id: assignee,
                })
                .await?;
            println!("Created task #{}: {}", task.id, task.name);
        }

        Command::Edit {
            id,
            name,
            description,
            clear_description,
            parent,
            detach,
            assignee,
            unassign,
            status,
        } => {
            let status = match status {
                Some(raw) => Some(
                    TaskStatus::from_str(&raw).ok_or_else(|| TaskError::invalid_status(&raw))?,
                ),
                None => None,
            };

            let input = EditTaskInput {
                id,
                name,
                description: tri_state(description, clear_description),
                status,
                parent_id: tri_state(parent, detach),
                assignee_id: tri_state(assignee, unassign),
            };
            let task = service.edit_task(input).await?;
            println!("Updated task #{}: {}", task.id, task.name);
        }

        Command::Accept { id, actor } => {
            let task = service.accept_task(&id, &actor).await?;
            println!("Task #{} accepted by {}", task.id, actor);
        }

        Command::Done { id, actor } => {
            let completed = service.done_task(&id, &actor).await?;
            if completed.is_empty() {
                println!("Task #{} and its subtasks were already settled", id);
            } else {
                println!(
                    "Completed {} task(s): {}",
                    completed.len(),
                    completed
                        .iter()
                        .map(|id| format!("#{}", id))
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }

        Command::Progress { group, format } => {
            let forest = service.progression(&group).await?;
            match format {
                OutputFormat::Text => println!("{}", hierarchy::format_progression_display(&forest)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&forest)?),
            }
        }

        Command::List {
            group,
            assignee,
            format,
        } => {
            let tasks = match (&group, &assignee) {
                (Some(group), None) => service.group_tasks(group).await?,
                (None, Some(assignee)) => service.assigned_tasks(assignee).await?,
                _ => bail!("provide either --group or --assignee"),
            };
            match format {
                OutputFormat::Text => {
                    if tasks.is_empty() {
                        println!("No tasks found.");
                    }
                    for task in &tasks {
                        println!("{}", format_task_line(task));
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tasks)?),
            }
        }
    }

    Ok(())
}

/// Map a flag pair onto the edit tri-state: `--clear-x` wins, then `--x v`,
/// otherwise leave the field untouched.
fn tri_state(value: Option<String>, clear: bool) -> Option<Option<String>> {
    if clear { Some(None) } else { value.map(Some) }
}

/// One task per line for list output.
fn format_task_line(task: &Task) -> String {
    let assignee = task
        .assignee_id
        .as_deref()
        .map(|a| format!(" @{}", a))
        .unwrap_or_default();
    let parent = task
        .parent_id
        .as_deref()
        .map(|p| format!(" (subtask of #{})", p))
        .unwrap_or_default();

    format!(
        "#{} [{}] {}{}{}",
        task.id, task.status, task.name, assignee, parent
    )
}
