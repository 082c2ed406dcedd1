//! Core types for task tracking and progress rollup.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
///
/// `Done` and `Closed` are terminal: cascading completion never re-selects
/// a task in either state, and edits may not move a task out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Created,
    Doing,
    Done,
    Closed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
            TaskStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "created" => Some(TaskStatus::Created),
            "doing" => Some(TaskStatus::Doing),
            "done" => Some(TaskStatus::Done),
            "closed" => Some(TaskStatus::Closed),
            _ => None,
        }
    }

    /// Whether the status is terminal with respect to cascading.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Closed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task in a group's hierarchy.
///
/// `id` is opaque to the engine and unique within one group's task set.
/// `parent_id` of `None` marks a root task; at most one parent per task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub parent_id: Option<String>,
    pub assignee_id: Option<String>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A task annotated with derived progress and its children.
///
/// Built fresh per aggregation call and owned by the caller; progress is
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNode {
    #[serde(flatten)]
    pub task: Task,
    /// Derived completion percentage in `[0, 100]`.
    pub progress: u8,
    pub children: Vec<TaskNode>,
}

/// Input for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub group_id: String,
    pub created_by: String,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<String>,
    pub assignee_id: Option<String>,
}

/// Partial update for a task.
///
/// Clearable fields use two levels of `Option`: outer `None` leaves the
/// field unchanged, `Some(None)` clears it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditTaskInput {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub parent_id: Option<Option<String>>,
    pub assignee_id: Option<Option<String>>,
}

impl EditTaskInput {
    /// An edit for `id` that changes nothing until fields are filled in.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// True when no field is patched.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.parent_id.is_none()
            && self.assignee_id.is_none()
    }
}
