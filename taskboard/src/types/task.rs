//! The task record

use super::ids::TaskId;
use super::tags::Tags;
use super::workflow::{Priority, Status};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A card on the board.
///
/// Fields are read through accessors. `status` and `order` are only changed by
/// the ordering engine, the rest by [`Board`](crate::Board) edits. Records are
/// decoded exclusively through [`record::normalize`](crate::record::normalize),
/// so this type has no `Deserialize` impl.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub(crate) id: TaskId,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) status: Status,
    pub(crate) priority: Priority,
    pub(crate) tags: Tags,
    #[serde(serialize_with = "due_date::serialize")]
    pub(crate) due_date: Option<NaiveDate>,
    /// Manual position within the status group, 0-based and dense
    pub(crate) order: usize,
    pub(crate) created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a fresh, not yet placed task (order 0, no `updated_at`)
    pub(crate) fn new(
        title: impl Into<String>,
        status: Status,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskId::new(),
            title: title.into(),
            description: String::new(),
            status,
            priority,
            tags: Tags::new(),
            due_date: None,
            order: 0,
            created_at,
            updated_at: None,
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn priority(&self) -> &Priority {
        &self.priority
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Text searched by the free-text filter: title, description and tags
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.tags.join(" ")).to_lowercase()
    }
}

/// On-disk codec for `dueDate`: `YYYY-MM-DD`, or `""` when absent.
pub(crate) mod due_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => s.serialize_str(&d.format(FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    /// Lenient parse: anything that is not a calendar date means "no due date"
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(raw, FORMAT).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        let created = Utc.with_ymd_and_hms(2026, 10, 1, 9, 30, 0).unwrap();
        let mut task = Task::new("Write docs", Status::from("backlog"), "medium".into(), created);
        task.id = TaskId::from_string("t1");
        task.tags = Tags::parse("docs, writing");
        task
    }

    #[test]
    fn test_serialize_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["id"], "t1");
        assert_eq!(value["title"], "Write docs");
        assert_eq!(value["description"], "");
        assert_eq!(value["status"], "backlog");
        assert_eq!(value["priority"], "medium");
        assert_eq!(value["tags"], serde_json::json!(["docs", "writing"]));
        assert_eq!(value["dueDate"], "");
        assert_eq!(value["order"], 0);
        assert_eq!(value["createdAt"], "2026-10-01T09:30:00Z");
        assert!(value.get("updatedAt").is_none());
    }

    #[test]
    fn test_due_date_serialized_as_plain_date() {
        let mut task = sample();
        task.due_date = NaiveDate::from_ymd_opt(2026, 10, 20);
        let value = serde_json::to_value(task).unwrap();
        assert_eq!(value["dueDate"], "2026-10-20");
    }

    #[test]
    fn test_due_date_parse() {
        assert_eq!(
            due_date::parse("2026-02-28"),
            NaiveDate::from_ymd_opt(2026, 2, 28)
        );
        assert_eq!(due_date::parse(""), None);
        assert_eq!(due_date::parse("2026-02-30"), None);
        assert_eq!(due_date::parse("tomorrow"), None);
    }

    #[test]
    fn test_search_text() {
        let mut task = sample();
        task.description = "Cover the CLI".into();
        assert_eq!(task.search_text(), "write docs cover the cli docs writing");
    }
}
