//! Tolerant decoding of stored task records.
//!
//! [`normalize`] maps an untyped JSON record to a [`Task`] field by field and
//! never fails: anything missing or malformed falls back to a documented
//! default.
//!
//! | field | fallback |
//! |-------|----------|
//! | `id` | fresh id (numbers are kept as their decimal string) |
//! | `title`, `description` | empty string |
//! | `status` | the configured default status |
//! | `priority` | the configured default priority |
//! | `tags` | empty set; non-string entries are dropped, the rest normalized |
//! | `dueDate` | no due date unless a valid `YYYY-MM-DD` string |
//! | `order` | the record's index in its input sequence when not a finite number; negatives clamp to 0 |
//! | `createdAt` | `now` (RFC 3339 strings and epoch milliseconds are accepted) |
//! | `updatedAt` | absent |

use crate::config::BoardConfig;
use crate::types::{due_date, Priority, Status, Tags, Task, TaskId};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Decode one record. `index` is the record's position in its input sequence.
pub fn normalize(raw: &Value, index: usize, config: &BoardConfig, now: DateTime<Utc>) -> Task {
    let id = match raw.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => TaskId::from_string(s.clone()),
        Some(Value::Number(n)) => TaskId::from_string(n.to_string()),
        _ => TaskId::new(),
    };

    let status = str_field(raw, "status")
        .filter(|s| config.is_status(s))
        .map(Status::from)
        .unwrap_or_else(|| config.default_status().clone());

    let priority = str_field(raw, "priority")
        .filter(|p| config.is_priority(p))
        .map(Priority::from)
        .unwrap_or_else(|| config.default_priority().clone());

    let tags = match raw.get("tags") {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Tags::new(),
    };

    Task {
        id,
        title: str_field(raw, "title").unwrap_or_default().to_string(),
        description: str_field(raw, "description")
            .unwrap_or_default()
            .to_string(),
        status,
        priority,
        tags,
        due_date: str_field(raw, "dueDate").and_then(due_date::parse),
        order: order_field(raw).unwrap_or(index),
        created_at: timestamp_field(raw, "createdAt").unwrap_or(now),
        updated_at: timestamp_field(raw, "updatedAt"),
    }
}

/// Decode a whole collection.
///
/// Entries that are not JSON objects carry no task data and are skipped. A
/// record repeating an earlier record's id gets a fresh id so ids stay unique
/// across the collection. The result is not reindexed.
pub fn normalize_all(raw: &[Value], config: &BoardConfig, now: DateTime<Utc>) -> Vec<Task> {
    let mut seen = HashSet::with_capacity(raw.len());
    let mut tasks = Vec::with_capacity(raw.len());

    for (index, value) in raw.iter().enumerate() {
        if !value.is_object() {
            warn!("Skipping non-object task record at index {index}");
            continue;
        }
        let mut task = normalize(value, index, config, now);
        if !seen.insert(task.id.clone()) {
            let fresh = TaskId::new();
            warn!(
                "Duplicate task id '{}' at index {index}; reassigned to '{fresh}'",
                task.id
            );
            task.id = fresh.clone();
            seen.insert(fresh);
        }
        tasks.push(task);
    }

    tasks
}

fn str_field<'a>(raw: &'a Value, field: &str) -> Option<&'a str> {
    raw.get(field).and_then(Value::as_str)
}

fn order_field(raw: &Value) -> Option<usize> {
    let n = raw.get("order")?.as_f64()?;
    if !n.is_finite() {
        return None;
    }
    // float-to-int `as` saturates, so oversized values land on usize::MAX
    Some(if n <= 0.0 { 0 } else { n.floor() as usize })
}

fn timestamp_field(raw: &Value, field: &str) -> Option<DateTime<Utc>> {
    match raw.get(field)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}
