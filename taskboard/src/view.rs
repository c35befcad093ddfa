//! Filtered and sorted read-only projections of the board.
//!
//! A [`BoardView`] borrows the canonical collection, so building one cannot
//! change any task. Manual positions shown in a filtered view are never a
//! valid input for [`ordering::move_to`](crate::ordering::move_to), which
//! always indexes the unfiltered group.

use crate::config::BoardConfig;
use crate::error::{BoardError, Result};
use crate::types::{Priority, Status, Tags, Task};
use chrono::{Days, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Due-date bucket a task must fall into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueFilter {
    #[default]
    Any,
    /// No due date set
    None,
    /// Due strictly before today and not in the terminal status
    Overdue,
    Today,
    /// Due between today and seven days from today, inclusive
    Week,
}

impl DueFilter {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "any" | "all" => Ok(Self::Any),
            "none" => Ok(Self::None),
            "overdue" => Ok(Self::Overdue),
            "today" => Ok(Self::Today),
            "week" => Ok(Self::Week),
            _ => Err(BoardError::InvalidValue {
                kind: "due filter",
                value: s.trim().to_string(),
                expected: "any, none, overdue, today or week",
            }),
        }
    }

    fn matches(self, task: &Task, config: &BoardConfig, today: NaiveDate) -> bool {
        let due = task.due_date();
        match self {
            Self::Any => true,
            Self::None => due.is_none(),
            Self::Overdue => due.is_some_and(|d| d < today) && !config.is_terminal(task.status()),
            Self::Today => due == Some(today),
            Self::Week => {
                let end = today.checked_add_days(Days::new(7)).unwrap_or(NaiveDate::MAX);
                due.is_some_and(|d| today <= d && d <= end)
            }
        }
    }
}

/// Filter predicate; all active clauses must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    status: Option<Status>,
    priority: Option<Priority>,
    search: String,
    due: DueFilter,
    tags: Tags,
}

impl Filter {
    /// Matches every task
    pub fn new() -> Self {
        Self::default()
    }

    /// Only tasks in `status`; other columns come out empty
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Case-insensitive substring over title, description and tags
    pub fn with_search(mut self, search: impl AsRef<str>) -> Self {
        self.search = search.as_ref().trim().to_lowercase();
        self
    }

    pub fn with_due(mut self, due: DueFilter) -> Self {
        self.due = due;
        self
    }

    /// Every tag in `tags` must be on the task
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn priority(&self) -> Option<&Priority> {
        self.priority.as_ref()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn due(&self) -> DueFilter {
        self.due
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// True when no clause narrows the board
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, task: &Task, config: &BoardConfig, today: NaiveDate) -> bool {
        if self.status.as_ref().is_some_and(|s| s != task.status()) {
            return false;
        }
        if self.priority.as_ref().is_some_and(|p| p != task.priority()) {
            return false;
        }
        if !self.due.matches(task, config, today) {
            return false;
        }
        if !self.search.is_empty() && !task.search_text().contains(&self.search) {
            return false;
        }
        task.tags().contains_all(&self.tags)
    }
}

/// Column sort order. Every mode is total: the last tie-break is the id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Manual order, then oldest first
    #[default]
    Manual,
    /// Most important first, then oldest first
    Priority,
    /// Soonest due first, undated last, then oldest first
    DueDate,
    /// Oldest first
    CreatedAt,
    /// Case-insensitive title, then oldest first
    Title,
}

impl SortMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "manual" => Ok(Self::Manual),
            "priority" => Ok(Self::Priority),
            "duedate" | "due" => Ok(Self::DueDate),
            "createdat" | "created" => Ok(Self::CreatedAt),
            "title" => Ok(Self::Title),
            _ => Err(BoardError::InvalidValue {
                kind: "sort mode",
                value: s.trim().to_string(),
                expected: "manual, priority, due-date, created-at or title",
            }),
        }
    }

    /// Compare two tasks of the same column
    pub fn compare(self, a: &Task, b: &Task, config: &BoardConfig) -> Ordering {
        let primary = match self {
            Self::Manual => a.order().cmp(&b.order()),
            Self::Priority => config
                .priority_rank(b.priority())
                .cmp(&config.priority_rank(a.priority())),
            Self::DueDate => match (a.due_date(), b.due_date()) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::CreatedAt => Ordering::Equal,
            Self::Title => collation_key(a.title())
                .cmp(&collation_key(b.title()))
                .then_with(|| a.title().to_lowercase().cmp(&b.title().to_lowercase()))
                .then_with(|| a.title().cmp(b.title())),
        };
        primary
            .then_with(|| a.created_at().cmp(&b.created_at()))
            .then_with(|| a.id().cmp(b.id()))
    }
}

/// Primary title sort key: decomposed, accents dropped, lower-cased
fn collation_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Manual => "manual",
            Self::Priority => "priority",
            Self::DueDate => "due-date",
            Self::CreatedAt => "created-at",
            Self::Title => "title",
        };
        f.write_str(name)
    }
}

/// Badge state of a task's due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DueState {
    NoDueDate,
    /// Past due and still open
    Overdue,
    /// Open and due within the configured window
    DueSoon,
    /// Any other dated task, including terminal ones
    Upcoming,
}

pub fn due_state(task: &Task, config: &BoardConfig, today: NaiveDate) -> DueState {
    let Some(due) = task.due_date() else {
        return DueState::NoDueDate;
    };
    if config.is_terminal(task.status()) {
        return DueState::Upcoming;
    }
    let days = (due - today).num_days();
    if days < 0 {
        DueState::Overdue
    } else if days <= i64::from(config.due_soon_days()) {
        DueState::DueSoon
    } else {
        DueState::Upcoming
    }
}

/// One status column of a view
#[derive(Debug, Clone, Serialize)]
pub struct ColumnView<'a> {
    pub status: &'a Status,
    pub label: &'a str,
    pub tasks: Vec<&'a Task>,
}

impl ColumnView<'_> {
    /// Number of tasks passing the filter
    pub fn count(&self) -> usize {
        self.tasks.len()
    }
}

/// Columns in configured status order
#[derive(Debug, Clone, Serialize)]
pub struct BoardView<'a> {
    pub columns: Vec<ColumnView<'a>>,
}

impl<'a> BoardView<'a> {
    pub fn column(&self, status: &str) -> Option<&ColumnView<'a>> {
        self.columns.iter().find(|c| c.status == status)
    }

    /// Post-filter size of every column, in status order
    pub fn counts(&self) -> IndexMap<Status, usize> {
        self.columns
            .iter()
            .map(|c| (c.status.clone(), c.count()))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(ColumnView::count).sum()
    }
}

/// Group, filter and sort `tasks` into one column per configured status
pub fn project<'a>(
    tasks: &'a [Task],
    config: &'a BoardConfig,
    filter: &Filter,
    sort: SortMode,
    today: NaiveDate,
) -> BoardView<'a> {
    let columns = config
        .statuses()
        .iter()
        .map(|def| {
            let mut column: Vec<&Task> = tasks
                .iter()
                .filter(|t| t.status() == &def.id && filter.matches(t, config, today))
                .collect();
            column.sort_by(|a, b| sort.compare(a, b, config));
            ColumnView {
                status: &def.id,
                label: &def.label,
                tasks: column,
            }
        })
        .collect();
    BoardView { columns }
}
