//! Task hierarchy construction and progress rollup.
//!
//! Turns a flat, group-scoped task slice into a forest of [`TaskNode`]s with
//! derived progress, renders that forest as a text tree, and answers the
//! subtree queries used by cascading completion. Everything here is pure:
//! no I/O, no clock, the caller hands in one snapshot per call.

use crate::types::{Task, TaskNode, TaskStatus};
use std::collections::HashMap;

/// Message rendered when a group has no tasks at all.
pub const EMPTY_DISPLAY: &str = "No tasks yet. Create one to start tracking progress.";

/// Hard bound on ancestor-chain walks, guarding against malformed input.
pub const MAX_ANCESTOR_WALK: usize = 4096;

/// Build the forest for one group's tasks.
///
/// Roots are tasks without a parent, in input order; children attach in input
/// order to arbitrary depth. Tasks whose `parent_id` does not resolve within
/// the slice are excluded from the forest entirely. That is policy, not an
/// error: create/edit validation is strict, read-time traversal is lenient.
pub fn build_hierarchy(tasks: &[Task]) -> Vec<TaskNode> {
    let index = children_index(tasks);

    tasks
        .iter()
        .filter(|task| task.parent_id.is_none())
        .map(|root| build_node(root, &index))
        .collect()
}

/// Parent id to children, children kept in input order.
fn children_index<'a>(tasks: &'a [Task]) -> HashMap<&'a str, Vec<&'a Task>> {
    let mut index: HashMap<&str, Vec<&Task>> = HashMap::new();
    for task in tasks {
        if let Some(parent_id) = task.parent_id.as_deref() {
            index.entry(parent_id).or_default().push(task);
        }
    }
    index
}

fn build_node(task: &Task, index: &HashMap<&str, Vec<&Task>>) -> TaskNode {
    let children: Vec<TaskNode> = index
        .get(task.id.as_str())
        .map(|kids| kids.iter().map(|child| build_node(child, index)).collect())
        .unwrap_or_default();

    let progress = node_progress(task, &children);

    TaskNode {
        task: task.clone(),
        progress,
        children,
    }
}

/// Progress for one node, children already computed (post-order).
///
/// A `done` task reports 100 unconditionally, overriding its children.
/// A childless task maps straight from status. Otherwise the node reports
/// the rounded mean of its children.
fn node_progress(task: &Task, children: &[TaskNode]) -> u8 {
    if task.status == TaskStatus::Done {
        return 100;
    }

    if children.is_empty() {
        return status_progress(task.status);
    }

    let total: u32 = children.iter().map(|child| u32::from(child.progress)).sum();
    round_ratio(total, children.len() as u32)
}

/// Status to percentage for childless tasks.
///
/// Only `done` signals completion; `doing` and `closed` both render 0.
fn status_progress(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::Created => 0,
        TaskStatus::Doing => 0,
        TaskStatus::Done => 100,
        TaskStatus::Closed => 0,
    }
}

/// Round half-up mean of `total` over `count`.
fn round_ratio(total: u32, count: u32) -> u8 {
    (f64::from(total) / f64::from(count)).round() as u8
}

/// Every task transitively below `parent_id`, depth-first in discovery order.
///
/// Applies the same dangling-reference policy as [`build_hierarchy`]: a task
/// is only reachable through parent links that resolve within the slice.
pub fn all_descendants<'a>(parent_id: &str, tasks: &'a [Task]) -> Vec<&'a Task> {
    let index = children_index(tasks);
    let mut out = Vec::new();
    collect_descendants(parent_id, &index, &mut out, 0);
    out
}

fn collect_descendants<'a>(
    parent_id: &str,
    index: &HashMap<&str, Vec<&'a Task>>,
    out: &mut Vec<&'a Task>,
    depth: usize,
) {
    if depth >= MAX_ANCESTOR_WALK {
        return;
    }
    if let Some(children) = index.get(parent_id) {
        for child in children {
            out.push(child);
            collect_descendants(&child.id, index, out, depth + 1);
        }
    }
}

/// Ids of descendants of `parent_id` that a completion cascade must update.
///
/// Tasks already `done` or `closed` are never re-selected.
pub fn children_to_mark_as_done(parent_id: &str, tasks: &[Task]) -> Vec<String> {
    all_descendants(parent_id, tasks)
        .into_iter()
        .filter(|task| !task.status.is_terminal())
        .map(|task| task.id.clone())
        .collect()
}

/// The full cascade set for completing `task_id`: the task itself when it is
/// not already terminal, then every non-terminal descendant.
///
/// An empty result means the whole subtree is already settled and no write
/// is needed.
pub fn tasks_to_complete(task_id: &str, tasks: &[Task]) -> Vec<String> {
    let mut ids = Vec::new();

    if let Some(task) = tasks.iter().find(|task| task.id == task_id) {
        if !task.status.is_terminal() {
            ids.push(task.id.clone());
        }
    }

    ids.extend(children_to_mark_as_done(task_id, tasks));
    ids
}

// =============================================================================
// Text rendering
// =============================================================================

/// Render the forest as a tree with per-task progress bars.
///
/// Deterministic for identical input; an empty forest yields
/// [`EMPTY_DISPLAY`], never a blank string.
pub fn format_progression_display(forest: &[TaskNode]) -> String {
    if forest.is_empty() {
        return EMPTY_DISPLAY.to_string();
    }

    let mut out = String::new();
    out.push_str("╔════════════════════════════╗\n");
    out.push_str("║        TASK PROGRESS       ║\n");
    out.push_str("╚════════════════════════════╝\n\n");

    let total: u32 = forest.iter().map(|node| u32::from(node.progress)).sum();
    let overall = round_ratio(total, forest.len() as u32);
    out.push_str(&format!(
        "Overall: {} {:>3}%\n\n",
        progress_bar(overall, 20),
        overall
    ));
    out.push_str(&"─".repeat(40));
    out.push_str("\n\n");

    for (i, node) in forest.iter().enumerate() {
        let is_last = i + 1 == forest.len();
        render_node(node, "", is_last, 0, &mut out);
        if !is_last {
            out.push('\n');
        }
    }

    out
}

fn render_node(node: &TaskNode, prefix: &str, is_last: bool, level: usize, out: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    let continuation = if is_last { "   " } else { "│  " };

    out.push_str(&format!(
        "{}{} {} {} #{}\n",
        prefix,
        connector,
        status_marker(node.task.status),
        node.task.name,
        node.task.id
    ));

    let body_prefix = format!("{}{}", prefix, continuation);

    // bars shrink with depth, never below 6 cells
    let bar_len = 12usize.saturating_sub(level * 2).max(6);
    out.push_str(&format!(
        "{}{} {:>3}%\n",
        body_prefix,
        progress_bar(node.progress, bar_len),
        node.progress
    ));

    if let Some(description) = &node.task.description {
        out.push_str(&format!("{}{}", body_prefix, description));
        if node.task.status == TaskStatus::Closed {
            out.push_str(" [closed]");
        }
        out.push('\n');
    }

    if !node.children.is_empty() {
        out.push_str(&body_prefix);
        out.push('\n');
    }

    for (i, child) in node.children.iter().enumerate() {
        let child_is_last = i + 1 == node.children.len();
        render_node(child, &body_prefix, child_is_last, level + 1, out);
    }
}

fn status_marker(status: TaskStatus) -> char {
    match status {
        TaskStatus::Created => '○',
        TaskStatus::Doing => '◐',
        TaskStatus::Done => '●',
        TaskStatus::Closed => '◌',
    }
}

/// Fill glyph by progress bucket; density rises with the percentage.
fn fill_glyph(progress: u8) -> char {
    match progress {
        100 => '█',
        75..=99 => '▇',
        50..=74 => '▓',
        25..=49 => '▒',
        _ => '░',
    }
}

const EMPTY_GLYPH: char = '·';

fn progress_bar(progress: u8, length: usize) -> String {
    let filled = ((f64::from(progress) / 100.0) * length as f64).round() as usize;
    let filled = filled.min(length);

    let mut bar = String::with_capacity(length * 3);
    for _ in 0..filled {
        bar.push(fill_glyph(progress));
    }
    for _ in filled..length {
        bar.push(EMPTY_GLYPH);
    }
    bar
}
