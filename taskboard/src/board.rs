//! The board engine instance.

use crate::clock::{Clock, SystemClock};
use crate::config::BoardConfig;
use crate::error::{BoardError, Result};
use crate::ordering;
use crate::persistence::{LoadReport, Persistence};
use crate::store::KeyValueStore;
use crate::types::{Priority, Status, Tags, Task, TaskId};
use crate::view::{self, BoardView, DueState, Filter, SortMode};
use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Input for [`Board::create`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    /// Configured default status when `None`
    pub status: Option<Status>,
    /// Configured default priority when `None`
    pub priority: Option<Priority>,
    pub tags: Tags,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<Status>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial edit for [`Board::update`]; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub tags: Option<Tags>,
    /// `Some(None)` clears the due date
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: impl Into<Status>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// One board: its configuration, canonical collection, view state and store.
///
/// Every mutating operation restores the ordering invariants, then writes the
/// whole collection to the store before returning. A failed write is logged
/// and absorbed; the board keeps working in memory and
/// [`persistence_healthy`](Self::persistence_healthy) turns false until a
/// later write succeeds.
///
/// Caller mistakes (empty title, unknown id, status or priority) are returned
/// as errors and leave the board unchanged.
pub struct Board<S, C = SystemClock> {
    config: BoardConfig,
    persistence: Persistence<S>,
    clock: C,
    tasks: Vec<Task>,
    filter: Filter,
    sort: SortMode,
    report: LoadReport,
}

impl<S: KeyValueStore> Board<S> {
    /// Load the board from `store` using the wall clock
    pub fn open(config: BoardConfig, store: S) -> Self {
        Self::open_with_clock(config, store, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> Board<S, C> {
    pub fn open_with_clock(config: BoardConfig, store: S, clock: C) -> Self {
        Self::with_persistence(config, Persistence::new(store), clock)
    }

    /// Load through a prepared gateway, e.g. one with extra legacy adapters
    pub fn with_persistence(config: BoardConfig, mut persistence: Persistence<S>, clock: C) -> Self {
        let (tasks, report) = persistence.load(&config, clock.now());
        debug!(
            "Opened board with {} tasks ({} recovered issues)",
            tasks.len(),
            report.issues.len()
        );
        Self {
            config,
            persistence,
            clock,
            tasks,
            filter: Filter::default(),
            sort: SortMode::default(),
            report,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a task at the head of its status group
    pub fn create(&mut self, input: NewTask) -> Result<Task> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        let status = match &input.status {
            Some(status) => self.config.parse_status(status.as_str())?,
            None => self.config.default_status().clone(),
        };
        let priority = match &input.priority {
            Some(priority) => self.config.parse_priority(priority.as_str())?,
            None => self.config.default_priority().clone(),
        };

        let mut task = Task::new(title, status, priority, self.clock.now());
        task.description = input.description.trim().to_string();
        task.tags = input.tags;
        task.due_date = input.due_date;
        let created = task.clone();

        ordering::insert_at_head(&mut self.tasks, task);
        debug!("Created task {} in '{}'", created.id, created.status);
        self.persist();
        Ok(created)
    }

    /// Apply a partial edit. A status change lands the task in its new group
    /// and reindexes every group.
    pub fn update(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Task> {
        let idx = self.index_of(id)?;

        let title = match &patch.title {
            Some(title) if title.trim().is_empty() => return Err(BoardError::EmptyTitle),
            Some(title) => Some(title.trim().to_string()),
            None => None,
        };
        let status = patch
            .status
            .as_ref()
            .map(|s| self.config.parse_status(s.as_str()))
            .transpose()?;
        let priority = patch
            .priority
            .as_ref()
            .map(|p| self.config.parse_priority(p.as_str()))
            .transpose()?;

        let now = self.clock.now();
        let task = &mut self.tasks[idx];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description.trim().to_string();
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        task.updated_at = Some(now);

        if let Some(status) = status {
            ordering::transition(&mut self.tasks, id, &status, now)?;
        }

        debug!("Updated task {id}");
        self.persist();
        Ok(self.tasks[idx].clone())
    }

    /// Remove a task; its former group is reindexed
    pub fn delete(&mut self, id: &TaskId) -> Result<Task> {
        let task = ordering::remove(&mut self.tasks, id)?;
        debug!("Deleted task {id}");
        self.persist();
        Ok(task)
    }

    /// Place a task at `target` in the unfiltered `status` group.
    ///
    /// Out-of-range targets are clamped.
    pub fn move_to(&mut self, id: &TaskId, status: &Status, target: i64) -> Result<()> {
        let status = self.config.parse_status(status.as_str())?;
        ordering::move_to(&mut self.tasks, id, &status, target, self.clock.now())?;
        debug!("Moved task {id} to '{status}' at {target}");
        self.persist();
        Ok(())
    }

    /// Advance a task to its next status.
    ///
    /// Returns `false` for a task in the terminal status; nothing is changed
    /// or written in that case.
    pub fn advance_status(&mut self, id: &TaskId) -> Result<bool> {
        let advanced =
            ordering::advance_status(&mut self.tasks, id, &self.config, self.clock.now())?;
        if advanced {
            debug!("Advanced task {id}");
            self.persist();
        }
        Ok(advanced)
    }

    /// Remove every task in `status`, returning how many were removed
    pub fn clear_status(&mut self, status: &Status) -> Result<usize> {
        let status = self.config.parse_status(status.as_str())?;
        let removed = ordering::remove_status(&mut self.tasks, &status);
        if !removed.is_empty() {
            debug!("Cleared {} tasks from '{status}'", removed.len());
            self.persist();
        }
        Ok(removed.len())
    }

    /// Remove every task in the terminal status
    pub fn clear_terminal(&mut self) -> usize {
        let terminal = self.config.terminal_status().clone();
        // a validated config always contains its terminal status
        self.clear_status(&terminal).unwrap_or_default()
    }

    // =========================================================================
    // View state
    // =========================================================================

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn set_sort(&mut self, sort: SortMode) {
        self.sort = sort;
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    /// Current filtered, sorted projection
    pub fn view(&self) -> BoardView<'_> {
        view::project(
            &self.tasks,
            &self.config,
            &self.filter,
            self.sort,
            self.clock.today(),
        )
    }

    /// Post-filter task count per status, in status order
    pub fn counts(&self) -> IndexMap<Status, usize> {
        self.view().counts()
    }

    pub fn due_state(&self, task: &Task) -> DueState {
        view::due_state(task, &self.config, self.clock.today())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Canonical collection, in storage order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    /// How the collection was obtained when the board was opened
    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// Whether the last write reached the store
    pub fn persistence_healthy(&self) -> bool {
        self.persistence.is_healthy()
    }

    fn index_of(&self, id: &TaskId) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| BoardError::not_found(id))
    }

    fn persist(&mut self) {
        if let Err(err) = self.persistence.save(&self.config, &self.tasks) {
            warn!("Could not persist board, continuing in memory: {err}");
        }
    }
}
