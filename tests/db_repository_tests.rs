//! Integration tests for the SQLite repository.
//!
//! These exercise the inherent (synchronous) Database operations against an
//! in-memory database; the async trait surface delegates to the same code.

use task_rollup::db::Database;
use task_rollup::types::{CreateTaskInput, EditTaskInput, TaskStatus};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn create_input(group: &str, name: &str) -> CreateTaskInput {
    CreateTaskInput {
        group_id: group.to_string(),
        created_by: "u1".to_string(),
        name: name.to_string(),
        description: None,
        parent_id: None,
        assignee_id: None,
    }
}

mod create_tests {
    use super::*;

    #[test]
    fn create_assigns_id_and_defaults() {
        let db = setup_db();

        let task = db
            .create_task(&create_input("g1", "write release notes"))
            .expect("Failed to create task");

        assert!(task.id.parse::<i64>().is_ok());
        assert_eq!(task.status, TaskStatus::Created);
        assert_eq!(task.group_id, "g1");
        assert_eq!(task.created_by, "u1");
        assert!(task.created_at > 0);
        assert_eq!(task.created_at, task.updated_at);
        assert!(task.parent_id.is_none());
    }

    #[test]
    fn create_with_assignee_still_starts_created() {
        let db = setup_db();

        let mut input = create_input("g1", "claimed from birth");
        input.assignee_id = Some("u2".to_string());
        let task = db.create_task(&input).expect("Failed to create task");

        assert_eq!(task.assignee_id.as_deref(), Some("u2"));
        assert_eq!(task.status, TaskStatus::Created);
    }

    #[test]
    fn create_stores_parent_reference() {
        let db = setup_db();

        let parent = db
            .create_task(&create_input("g1", "parent"))
            .expect("Failed to create parent");
        let mut input = create_input("g1", "child");
        input.parent_id = Some(parent.id.clone());
        let child = db.create_task(&input).expect("Failed to create child");

        assert_eq!(child.parent_id, Some(parent.id));
    }
}

mod get_tests {
    use super::*;

    #[test]
    fn get_missing_task_returns_none() {
        let db = setup_db();

        assert!(db.get_task("999").expect("query failed").is_none());
    }

    #[test]
    fn get_with_unparseable_id_returns_none() {
        let db = setup_db();

        assert!(db.get_task("not-a-number").expect("query failed").is_none());
    }

    #[test]
    fn tasks_by_group_are_scoped_and_in_creation_order() {
        let db = setup_db();

        let first = db.create_task(&create_input("g1", "first")).unwrap();
        let second = db.create_task(&create_input("g1", "second")).unwrap();
        db.create_task(&create_input("g2", "other group")).unwrap();
        let third = db.create_task(&create_input("g1", "third")).unwrap();

        let tasks = db
            .get_tasks_by_group("g1")
            .expect("Failed to list group tasks");
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();

        assert_eq!(ids, [first.id.as_str(), second.id.as_str(), third.id.as_str()]);
        assert!(tasks.iter().all(|t| t.group_id == "g1"));
    }
}

mod edit_tests {
    use super::*;

    #[test]
    fn unset_fields_keep_stored_values() {
        let db = setup_db();

        let mut input = create_input("g1", "original");
        input.description = Some("keep me".to_string());
        let task = db.create_task(&input).unwrap();

        let edit = EditTaskInput {
            name: Some("renamed".to_string()),
            ..EditTaskInput::new(task.id.clone())
        };
        let updated = db.edit_task(&edit).expect("Failed to edit task");

        assert_eq!(updated.name, "renamed");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert_eq!(updated.status, TaskStatus::Created);
    }

    #[test]
    fn some_none_clears_a_field() {
        let db = setup_db();

        let mut input = create_input("g1", "task");
        input.description = Some("stale".to_string());
        input.assignee_id = Some("u2".to_string());
        let task = db.create_task(&input).unwrap();

        let edit = EditTaskInput {
            description: Some(None),
            assignee_id: Some(None),
            ..EditTaskInput::new(task.id.clone())
        };
        let updated = db.edit_task(&edit).expect("Failed to edit task");

        assert!(updated.description.is_none());
        assert!(updated.assignee_id.is_none());
    }

    #[test]
    fn reparent_and_detach() {
        let db = setup_db();

        let parent = db.create_task(&create_input("g1", "parent")).unwrap();
        let task = db.create_task(&create_input("g1", "movable")).unwrap();

        let attach = EditTaskInput {
            parent_id: Some(Some(parent.id.clone())),
            ..EditTaskInput::new(task.id.clone())
        };
        let attached = db.edit_task(&attach).expect("Failed to attach");
        assert_eq!(attached.parent_id, Some(parent.id));

        let detach = EditTaskInput {
            parent_id: Some(None),
            ..EditTaskInput::new(task.id.clone())
        };
        let detached = db.edit_task(&detach).expect("Failed to detach");
        assert!(detached.parent_id.is_none());
    }

    #[test]
    fn edit_missing_task_is_an_error() {
        let db = setup_db();

        let edit = EditTaskInput {
            name: Some("ghost".to_string()),
            ..EditTaskInput::new("404")
        };
        assert!(db.edit_task(&edit).is_err());
    }
}

mod bulk_tests {
    use super::*;

    #[test]
    fn bulk_set_status_updates_exactly_the_listed_rows() {
        let db = setup_db();

        let a = db.create_task(&create_input("g1", "a")).unwrap();
        let b = db.create_task(&create_input("g1", "b")).unwrap();
        let c = db.create_task(&create_input("g1", "c")).unwrap();

        let updated = db
            .bulk_set_status(&[a.id.clone(), c.id.clone()], TaskStatus::Done)
            .expect("Failed to bulk update");
        assert_eq!(updated, 2);

        assert_eq!(db.get_task(&a.id).unwrap().unwrap().status, TaskStatus::Done);
        assert_eq!(
            db.get_task(&b.id).unwrap().unwrap().status,
            TaskStatus::Created
        );
        assert_eq!(db.get_task(&c.id).unwrap().unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn bulk_set_status_with_no_ids_writes_nothing() {
        let db = setup_db();

        let updated = db
            .bulk_set_status(&[], TaskStatus::Done)
            .expect("bulk update failed");
        assert_eq!(updated, 0);
    }
}

mod assigned_tests {
    use super::*;

    #[test]
    fn assigned_tasks_exclude_terminal_statuses() {
        let db = setup_db();

        let mut input = create_input("g1", "open claim");
        input.assignee_id = Some("u2".to_string());
        let open = db.create_task(&input).unwrap();

        let mut input = create_input("g1", "finished claim");
        input.assignee_id = Some("u2".to_string());
        let finished = db.create_task(&input).unwrap();
        db.bulk_set_status(std::slice::from_ref(&finished.id), TaskStatus::Done)
            .unwrap();

        let mut input = create_input("g1", "someone else");
        input.assignee_id = Some("u3".to_string());
        db.create_task(&input).unwrap();

        let claims = db
            .get_assigned_tasks("u2")
            .expect("Failed to list assigned tasks");
        let ids: Vec<&str> = claims.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, [open.id.as_str()]);
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn tasks_survive_reopen_of_a_file_database() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("tasks.db");

        let created = {
            let db = Database::open(&path).expect("Failed to open database");
            db.create_task(&create_input("g1", "durable")).unwrap()
        };

        let db = Database::open(&path).expect("Failed to reopen database");
        let task = db
            .get_task(&created.id)
            .expect("query failed")
            .expect("task lost on reopen");
        assert_eq!(task.name, "durable");
    }
}
