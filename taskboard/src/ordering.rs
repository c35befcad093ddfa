//! Manual ordering within status groups.
//!
//! These functions are the only code that changes a task's `status` or
//! `order`. Every one of them leaves each status group with a dense, 0-based,
//! duplicate-free `order` sequence.
//!
//! Ties in `order` (which only occur in unhealed input or right after a status
//! transition) are broken by position in the collection.

use crate::config::BoardConfig;
use crate::error::{BoardError, Result};
use crate::types::{Status, Task, TaskId};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// Collection indices of the tasks in `status`, in manual order
fn group(tasks: &[Task], status: &Status) -> Vec<usize> {
    let mut indices: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| &t.status == status)
        .map(|(i, _)| i)
        .collect();
    // sort_by_key is stable, so equal orders keep collection position
    indices.sort_by_key(|&i| tasks[i].order);
    indices
}

fn position(tasks: &[Task], id: &TaskId) -> Result<usize> {
    tasks
        .iter()
        .position(|t| &t.id == id)
        .ok_or_else(|| BoardError::not_found(id))
}

/// Place `task` first in its status group, shifting the rest of the group down
pub fn insert_at_head(tasks: &mut Vec<Task>, mut task: Task) {
    for existing in tasks.iter_mut().filter(|t| t.status == task.status) {
        existing.order += 1;
    }
    task.order = 0;
    tasks.push(task);
}

/// Reassign a dense `order` sequence to one status group. Idempotent.
pub fn reindex(tasks: &mut [Task], status: &Status) {
    for (order, i) in group(tasks, status).into_iter().enumerate() {
        tasks[i].order = order;
    }
}

/// Reindex every status group present in the collection
pub fn reindex_all(tasks: &mut [Task]) {
    let statuses: Vec<Status> = {
        let mut seen = HashSet::new();
        tasks
            .iter()
            .filter(|t| seen.insert(&t.status))
            .map(|t| t.status.clone())
            .collect()
    };
    for status in &statuses {
        reindex(tasks, status);
    }
}

/// Move a task into `status` at `target` within that group's manual order.
///
/// `target` is an index into the unfiltered destination group without the
/// moving task. Any value is accepted: negatives place the task first, values
/// past the end place it last. The source group is reindexed when the status
/// changes. Always stamps `updated_at`.
pub fn move_to(
    tasks: &mut [Task],
    id: &TaskId,
    status: &Status,
    target: i64,
    now: DateTime<Utc>,
) -> Result<()> {
    let idx = position(tasks, id)?;
    let prior = tasks[idx].status.clone();

    let mut destination: Vec<usize> = group(tasks, status)
        .into_iter()
        .filter(|&i| i != idx)
        .collect();
    let slot = target.clamp(0, destination.len() as i64) as usize;
    destination.insert(slot, idx);

    for (order, i) in destination.into_iter().enumerate() {
        tasks[i].order = order;
    }
    tasks[idx].status = status.clone();
    tasks[idx].updated_at = Some(now);

    if &prior != status {
        reindex(tasks, &prior);
    }
    Ok(())
}

/// Put a task in `status` keeping its current `order`, then reindex all groups.
///
/// Returns `false`, touching nothing, when the task is already in `status`.
pub fn transition(
    tasks: &mut [Task],
    id: &TaskId,
    status: &Status,
    now: DateTime<Utc>,
) -> Result<bool> {
    let idx = position(tasks, id)?;
    if &tasks[idx].status == status {
        return Ok(false);
    }
    tasks[idx].status = status.clone();
    tasks[idx].updated_at = Some(now);
    reindex_all(tasks);
    Ok(true)
}

/// Follow the configured adjacency table one step.
///
/// Returns `false` when the task's status has no successor (the terminal
/// status); nothing is changed in that case.
pub fn advance_status(
    tasks: &mut [Task],
    id: &TaskId,
    config: &BoardConfig,
    now: DateTime<Utc>,
) -> Result<bool> {
    let idx = position(tasks, id)?;
    match config.next_status(&tasks[idx].status).cloned() {
        Some(next) => transition(tasks, id, &next, now),
        None => Ok(false),
    }
}

/// Remove a task and close the gap in its former group
pub fn remove(tasks: &mut Vec<Task>, id: &TaskId) -> Result<Task> {
    let idx = position(tasks, id)?;
    let task = tasks.remove(idx);
    reindex(tasks, &task.status);
    Ok(task)
}

/// Remove every task in `status`, returning the removed tasks in manual order
pub fn remove_status(tasks: &mut Vec<Task>, status: &Status) -> Vec<Task> {
    let (mut removed, kept): (Vec<Task>, Vec<Task>) =
        tasks.drain(..).partition(|t| &t.status == status);
    *tasks = kept;
    removed.sort_by_key(|t| t.order);
    reindex_all(tasks);
    removed
}
