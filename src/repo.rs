//! Repository contract consumed by the lifecycle service.
//!
//! The service never issues raw queries; it only calls these semantic
//! operations. The production implementation lives in [`crate::db`], and
//! tests may substitute their own.

use crate::types::{CreateTaskInput, EditTaskInput, Task, TaskStatus};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Fetch one task by id.
    async fn get_task(&self, id: &str) -> Result<Option<Task>>;

    /// All tasks of a group, creation time ascending.
    async fn get_tasks_by_group(&self, group_id: &str) -> Result<Vec<Task>>;

    /// Non-terminal tasks currently claimed by an actor.
    async fn get_assigned_tasks(&self, assignee_id: &str) -> Result<Vec<Task>>;

    /// Persist a new task and return it with its assigned id.
    async fn store_task(&self, input: &CreateTaskInput) -> Result<Task>;

    /// Apply a partial update and return the updated task.
    ///
    /// Fields left unset in the input stay untouched.
    async fn edit_task(&self, input: &EditTaskInput) -> Result<Task>;

    /// Set the status of every listed task in one write.
    ///
    /// Returns the number of rows updated.
    async fn bulk_set_status(&self, ids: &[String], status: TaskStatus) -> Result<usize>;
}
