//! Structured domain errors for lifecycle operations.

use serde::Serialize;
use std::fmt;

use crate::types::TaskStatus;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Not found errors
    TaskNotFound,
    ParentNotFound,

    // Conflict errors
    AlreadyAssigned,

    // Permission errors
    NotAssignee,

    // Validation errors
    SelfParent,
    ParentCycle,
    NoFieldsToEdit,
    TerminalStatus,
    InvalidStatus,

    // Internal errors
    DatabaseError,
}

/// Broad error family, for boundary mapping of code to presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Permission,
    Validation,
    Internal,
}

impl ErrorCode {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::TaskNotFound | ErrorCode::ParentNotFound => ErrorKind::NotFound,
            ErrorCode::AlreadyAssigned => ErrorKind::Conflict,
            ErrorCode::NotAssignee => ErrorKind::Permission,
            ErrorCode::SelfParent
            | ErrorCode::ParentCycle
            | ErrorCode::NoFieldsToEdit
            | ErrorCode::TerminalStatus
            | ErrorCode::InvalidStatus => ErrorKind::Validation,
            ErrorCode::DatabaseError => ErrorKind::Internal,
        }
    }
}

/// Structured error raised by the lifecycle service.
#[derive(Debug, Serialize)]
pub struct TaskError {
    pub code: ErrorCode,
    pub message: String,
}

impl TaskError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    // Convenience constructors

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("task not found: {}", task_id),
        )
    }

    pub fn parent_not_found() -> Self {
        Self::new(ErrorCode::ParentNotFound, "parent task not found")
    }

    pub fn already_assigned(task_id: &str, assignee: &str) -> Self {
        Self::new(
            ErrorCode::AlreadyAssigned,
            format!("task {} is already assigned to {}", task_id, assignee),
        )
    }

    pub fn not_assignee(task_id: &str) -> Self {
        Self::new(
            ErrorCode::NotAssignee,
            format!("you are not the assignee of task {}", task_id),
        )
    }

    pub fn self_parent() -> Self {
        Self::new(ErrorCode::SelfParent, "a task cannot be its own parent")
    }

    pub fn parent_cycle(task_id: &str, parent_id: &str) -> Self {
        Self::new(
            ErrorCode::ParentCycle,
            format!(
                "moving task {} under {} would create a cycle",
                task_id, parent_id
            ),
        )
    }

    pub fn no_fields_to_edit() -> Self {
        Self::new(ErrorCode::NoFieldsToEdit, "no fields to edit")
    }

    pub fn terminal_status(task_id: &str, status: TaskStatus) -> Self {
        Self::new(
            ErrorCode::TerminalStatus,
            format!("task {} is {} and cannot change status", task_id, status),
        )
    }

    pub fn invalid_status(value: &str) -> Self {
        Self::new(
            ErrorCode::InvalidStatus,
            format!("unknown status: {}", value),
        )
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TaskError {}

// Allow using ? on repository results by converting anyhow errors
impl From<anyhow::Error> for TaskError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<TaskError>() {
            Ok(task_err) => task_err,
            Err(err) => TaskError::database(err),
        }
    }
}

/// Result type for lifecycle operations.
pub type TaskResult<T> = std::result::Result<T, TaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_kinds() {
        assert_eq!(ErrorCode::TaskNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ErrorCode::AlreadyAssigned.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::NotAssignee.kind(), ErrorKind::Permission);
        assert_eq!(ErrorCode::SelfParent.kind(), ErrorKind::Validation);
        assert_eq!(ErrorCode::DatabaseError.kind(), ErrorKind::Internal);
    }

    #[test]
    fn anyhow_round_trip_preserves_domain_error() {
        let err: anyhow::Error = TaskError::parent_not_found().into();
        let back: TaskError = err.into();
        assert_eq!(back.code, ErrorCode::ParentNotFound);
        assert_eq!(back.message, "parent task not found");
    }
}
