//! Lifecycle rules: validation gates for task mutations and orchestration of
//! cascading completion.
//!
//! One instance is constructed at startup with its repository injected and
//! passed by reference to every consumer; there is no global state here.

use crate::error::{TaskError, TaskResult};
use crate::hierarchy::{self, MAX_ANCESTOR_WALK};
use crate::repo::TaskRepository;
use crate::types::{CreateTaskInput, EditTaskInput, Task, TaskNode, TaskStatus};
use std::sync::Arc;
use tracing::{debug, info};

pub struct LifecycleService {
    repo: Arc<dyn TaskRepository>,
}

impl LifecycleService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    /// Create a task, validating the parent reference first.
    ///
    /// A parent must exist and belong to the same group; no other field
    /// validation happens here (name non-emptiness is a boundary concern).
    pub async fn create_task(&self, input: CreateTaskInput) -> TaskResult<Task> {
        if let Some(parent_id) = input.parent_id.as_deref() {
            let parent = self.repo.get_task(parent_id).await?;
            match parent {
                Some(parent) if parent.group_id == input.group_id => {}
                _ => return Err(TaskError::parent_not_found()),
            }
        }

        let task = self.repo.store_task(&input).await?;
        info!(task_id = %task.id, group_id = %task.group_id, "task created");
        Ok(task)
    }

    /// Apply a partial edit.
    ///
    /// Validation runs to completion before anything is written: the patch
    /// must not be empty, the task must exist, a new parent must resolve in
    /// the same group and must not create a cycle, and a status change may
    /// not leave a terminal state.
    pub async fn edit_task(&self, input: EditTaskInput) -> TaskResult<Task> {
        if input.is_empty() {
            return Err(TaskError::no_fields_to_edit());
        }

        let task = self
            .repo
            .get_task(&input.id)
            .await?
            .ok_or_else(|| TaskError::task_not_found(&input.id))?;

        if let Some(Some(parent_id)) = input.parent_id.as_ref() {
            if *parent_id == input.id {
                return Err(TaskError::self_parent());
            }
            let parent = self.repo.get_task(parent_id).await?;
            match parent {
                Some(parent) if parent.group_id == task.group_id => {}
                _ => return Err(TaskError::parent_not_found()),
            }
            self.ensure_no_cycle(&input.id, parent_id).await?;
        }

        if let Some(new_status) = input.status {
            if task.status.is_terminal() && new_status != task.status {
                return Err(TaskError::terminal_status(&task.id, task.status));
            }
        }

        let updated = self.repo.edit_task(&input).await?;
        info!(task_id = %updated.id, "task edited");
        Ok(updated)
    }

    /// Claim a task: sets the assignee and moves status to `doing`.
    pub async fn accept_task(&self, task_id: &str, actor_id: &str) -> TaskResult<Task> {
        let task = self
            .repo
            .get_task(task_id)
            .await?
            .ok_or_else(|| TaskError::task_not_found(task_id))?;

        if let Some(assignee) = task.assignee_id.as_deref() {
            return Err(TaskError::already_assigned(task_id, assignee));
        }

        let patch = EditTaskInput {
            assignee_id: Some(Some(actor_id.to_string())),
            status: Some(TaskStatus::Doing),
            ..EditTaskInput::new(task_id)
        };
        let updated = self.repo.edit_task(&patch).await?;
        info!(task_id = %task_id, actor_id = %actor_id, "task accepted");
        Ok(updated)
    }

    /// Complete a task and cascade completion through its subtree.
    ///
    /// Only the current assignee may complete a task. The cascade set is the
    /// task itself plus every descendant not already `done` or `closed`,
    /// written as a single bulk update. An empty set is an idempotent no-op.
    /// Returns the ids that were completed.
    pub async fn done_task(&self, task_id: &str, actor_id: &str) -> TaskResult<Vec<String>> {
        let task = self
            .repo
            .get_task(task_id)
            .await?
            .ok_or_else(|| TaskError::task_not_found(task_id))?;

        if task.assignee_id.as_deref() != Some(actor_id) {
            return Err(TaskError::not_assignee(task_id));
        }

        let group_tasks = self.repo.get_tasks_by_group(&task.group_id).await?;
        let ids = hierarchy::tasks_to_complete(task_id, &group_tasks);

        if ids.is_empty() {
            debug!(task_id = %task_id, "subtree already settled, nothing to complete");
            return Ok(ids);
        }

        self.repo.bulk_set_status(&ids, TaskStatus::Done).await?;
        info!(task_id = %task_id, completed = ids.len(), "task completed");
        debug!(cascade = ?ids, "completion cascade");
        Ok(ids)
    }

    /// The annotated forest for one group, recomputed from a fresh snapshot.
    pub async fn progression(&self, group_id: &str) -> TaskResult<Vec<TaskNode>> {
        let tasks = self.repo.get_tasks_by_group(group_id).await?;
        Ok(hierarchy::build_hierarchy(&tasks))
    }

    /// Open tasks claimed by an actor.
    pub async fn assigned_tasks(&self, assignee_id: &str) -> TaskResult<Vec<Task>> {
        Ok(self.repo.get_assigned_tasks(assignee_id).await?)
    }

    /// All tasks of a group, creation order.
    pub async fn group_tasks(&self, group_id: &str) -> TaskResult<Vec<Task>> {
        Ok(self.repo.get_tasks_by_group(group_id).await?)
    }

    /// Reject a parent reassignment that would make `task_id` its own
    /// ancestor. Walks up from the prospective parent with a hard bound so a
    /// malformed chain cannot loop forever.
    async fn ensure_no_cycle(&self, task_id: &str, parent_id: &str) -> TaskResult<()> {
        let mut current = parent_id.to_string();
        for _ in 0..MAX_ANCESTOR_WALK {
            let Some(task) = self.repo.get_task(&current).await? else {
                return Ok(());
            };
            match task.parent_id {
                Some(ancestor) if ancestor == task_id => {
                    return Err(TaskError::parent_cycle(task_id, parent_id));
                }
                Some(ancestor) => current = ancestor,
                None => return Ok(()),
            }
        }
        Err(TaskError::parent_cycle(task_id, parent_id))
    }
}
