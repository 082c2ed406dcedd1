//! Task CRUD, partial updates, and the bulk status write.
//!
//! Ids are integer rowids exposed to the rest of the crate as opaque decimal
//! strings. An id string that does not parse simply matches nothing, which
//! reads the same as "not found".

use super::{Database, now_ms};
use crate::error::TaskError;
use crate::repo::TaskRepository;
use crate::types::{CreateTaskInput, EditTaskInput, Task, TaskStatus};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rusqlite::types::Value;
use rusqlite::{Connection, Row, params, params_from_iter};

fn parse_id(id: &str) -> Option<i64> {
    id.parse::<i64>().ok()
}

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let id: i64 = row.get("id")?;
    let group_id: String = row.get("group_id")?;
    let name: String = row.get("name")?;
    let description: Option<String> = row.get("description")?;
    let status_raw: String = row.get("status")?;
    let parent_id: Option<i64> = row.get("parent_id")?;
    let assignee_id: Option<String> = row.get("assignee_id")?;
    let created_by: String = row.get("created_by")?;
    let created_at: i64 = row.get("created_at")?;
    let updated_at: i64 = row.get("updated_at")?;

    let status = TaskStatus::from_str(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown status: {}", status_raw).into(),
        )
    })?;

    Ok(Task {
        id: id.to_string(),
        group_id,
        name,
        description,
        status,
        parent_id: parent_id.map(|p| p.to_string()),
        assignee_id,
        created_by,
        created_at,
        updated_at,
    })
}

/// Internal helper to get a task using an existing connection.
fn get_task_internal(conn: &Connection, id: i64) -> Result<Option<Task>> {
    let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;

    let result = stmt.query_row(params![id], parse_task_row);

    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// Insert a new task; status always starts at `created`.
    pub fn create_task(&self, input: &CreateTaskInput) -> Result<Task> {
        let now = now_ms();
        let parent_id = input.parent_id.as_deref().and_then(parse_id);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (group_id, name, description, status, parent_id,
                                    assignee_id, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    input.group_id,
                    input.name,
                    input.description,
                    TaskStatus::Created.as_str(),
                    parent_id,
                    input.assignee_id,
                    input.created_by,
                    now,
                    now,
                ],
            )?;

            let id = conn.last_insert_rowid();
            get_task_internal(conn, id)?.ok_or_else(|| anyhow!("task {} vanished after insert", id))
        })
    }

    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        self.with_conn(|conn| get_task_internal(conn, id))
    }

    /// All tasks of a group, creation time ascending.
    pub fn get_tasks_by_group(&self, group_id: &str) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks WHERE group_id = ?1 ORDER BY created_at, id",
            )?;

            let tasks = stmt
                .query_map(params![group_id], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(tasks)
        })
    }

    /// Open claims of one actor, creation time ascending.
    pub fn get_assigned_tasks(&self, assignee_id: &str) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks
                 WHERE assignee_id = ?1 AND status NOT IN ('done', 'closed')
                 ORDER BY created_at, id",
            )?;

            let tasks = stmt
                .query_map(params![assignee_id], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(tasks)
        })
    }

    /// Apply a partial update: unset fields keep their stored value,
    /// `Some(None)` clears, `Some(Some(v))` overwrites.
    pub fn edit_task(&self, input: &EditTaskInput) -> Result<Task> {
        let now = now_ms();
        let id = parse_id(&input.id)
            .ok_or_else(|| anyhow::Error::new(TaskError::task_not_found(&input.id)))?;

        self.with_conn(|conn| {
            let task = get_task_internal(conn, id)?
                .ok_or_else(|| anyhow::Error::new(TaskError::task_not_found(&input.id)))?;

            let name = input.name.clone().unwrap_or(task.name);
            let description = input.description.clone().unwrap_or(task.description);
            let status = input.status.unwrap_or(task.status);
            let parent_id = input
                .parent_id
                .clone()
                .unwrap_or(task.parent_id)
                .as_deref()
                .and_then(parse_id);
            let assignee_id = input.assignee_id.clone().unwrap_or(task.assignee_id);

            conn.execute(
                "UPDATE tasks SET name = ?1, description = ?2, status = ?3,
                                  parent_id = ?4, assignee_id = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    name,
                    description,
                    status.as_str(),
                    parent_id,
                    assignee_id,
                    now,
                    id,
                ],
            )?;

            get_task_internal(conn, id)?.ok_or_else(|| anyhow!("task {} vanished after update", id))
        })
    }

    /// Set the status of every listed task in a single statement.
    pub fn bulk_set_status(&self, ids: &[String], status: TaskStatus) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let now = now_ms();

        self.with_conn(|conn| {
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!(
                "UPDATE tasks SET status = ?, updated_at = ? WHERE id IN ({})",
                placeholders
            );

            let mut values: Vec<Value> = Vec::with_capacity(ids.len() + 2);
            values.push(Value::from(status.as_str().to_string()));
            values.push(Value::from(now));
            for id in ids {
                values.push(Value::from(parse_id(id).unwrap_or(-1)));
            }

            let updated = conn.execute(&sql, params_from_iter(values))?;
            Ok(updated)
        })
    }
}

#[async_trait]
impl TaskRepository for Database {
    async fn get_task(&self, id: &str) -> Result<Option<Task>> {
        Database::get_task(self, id)
    }

    async fn get_tasks_by_group(&self, group_id: &str) -> Result<Vec<Task>> {
        Database::get_tasks_by_group(self, group_id)
    }

    async fn get_assigned_tasks(&self, assignee_id: &str) -> Result<Vec<Task>> {
        Database::get_assigned_tasks(self, assignee_id)
    }

    async fn store_task(&self, input: &CreateTaskInput) -> Result<Task> {
        Database::create_task(self, input)
    }

    async fn edit_task(&self, input: &EditTaskInput) -> Result<Task> {
        Database::edit_task(self, input)
    }

    async fn bulk_set_status(&self, ids: &[String], status: TaskStatus) -> Result<usize> {
        Database::bulk_set_status(self, ids, status)
    }
}
