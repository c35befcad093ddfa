//! Board configuration: workflow statuses, priorities and defaults.
//!
//! The engine never hard-codes a status or priority set. A [`BoardConfig`] is
//! built from one of the built-in [`Preset`]s, optionally overridden by
//! configuration files and `TASKBOARD_*` environment variables:
//!
//! 1. Preset defaults (`preset` key, `classic` when absent)
//! 2. Configuration files, in the order given (YAML, TOML or JSON by extension)
//! 3. Environment variables with the `TASKBOARD_` prefix
//!
//! Later sources override earlier ones. A `BoardConfig` value is always valid:
//! every constructor runs the same consistency checks.
//!
//! ```yaml
//! preset: review
//! default_priority: high
//! due_soon_days: 3
//! ```

use crate::error::{BoardError, Result};
use crate::types::{Priority, Status};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Storage key of the current schema generation
pub const DEFAULT_STORAGE_KEY: &str = "kanban.tasks.v1";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "TASKBOARD_";

const DEFAULT_DUE_SOON_DAYS: u32 = 2;

/// Built-in product variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// backlog / in-progress / blocked / done, low / medium / high
    #[default]
    Classic,
    /// Classic statuses plus an `urgent` priority
    Urgent,
    /// Adds a `review` stage between in-progress and done
    Review,
}

impl Preset {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "urgent" => Ok(Self::Urgent),
            "review" => Ok(Self::Review),
            other => Err(BoardError::invalid_config(format!(
                "unknown preset '{other}': must be classic, urgent or review"
            ))),
        }
    }
}

/// One workflow status (one board column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDef {
    pub id: Status,
    pub label: String,
    /// Target of `advance_status`; `None` means advancing is a no-op
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Status>,
    /// Button text for the advance action, e.g. "Start"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advance_label: Option<String>,
}

impl StatusDef {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: Status::from(id),
            label: label.to_string(),
            next: None,
            advance_label: None,
        }
    }

    pub fn advances_to(mut self, next: &str, label: &str) -> Self {
        self.next = Some(Status::from(next));
        self.advance_label = Some(label.to_string());
        self
    }
}

/// One priority level. Rank is the position in [`BoardConfig::priorities`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityDef {
    pub id: Priority,
    pub label: String,
}

impl PriorityDef {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: Priority::from(id),
            label: label.to_string(),
        }
    }
}

/// Unvalidated configuration as extracted from files and environment.
///
/// Every field is optional; absent fields come from the selected preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBoardConfig {
    pub preset: Option<Preset>,
    pub storage_key: Option<String>,
    pub statuses: Option<Vec<StatusDef>>,
    pub terminal_status: Option<Status>,
    pub default_status: Option<Status>,
    pub priorities: Option<Vec<PriorityDef>>,
    pub default_priority: Option<Priority>,
    pub due_soon_days: Option<u32>,
}

/// Validated board configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardConfig {
    storage_key: String,
    statuses: Vec<StatusDef>,
    terminal_status: Status,
    default_status: Status,
    priorities: Vec<PriorityDef>,
    default_priority: Priority,
    due_soon_days: u32,
}

impl BoardConfig {
    /// Four statuses, three priorities
    pub fn classic() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            statuses: vec![
                StatusDef::new("backlog", "Backlog").advances_to("in-progress", "Start"),
                StatusDef::new("in-progress", "In Progress").advances_to("done", "Block/Done"),
                StatusDef::new("blocked", "Blocked").advances_to("in-progress", "Unblock"),
                StatusDef::new("done", "Done"),
            ],
            terminal_status: Status::from("done"),
            default_status: Status::from("backlog"),
            priorities: vec![
                PriorityDef::new("low", "Low"),
                PriorityDef::new("medium", "Medium"),
                PriorityDef::new("high", "High"),
            ],
            default_priority: Priority::from("medium"),
            due_soon_days: DEFAULT_DUE_SOON_DAYS,
        }
    }

    /// Classic statuses with an extra `urgent` priority above `high`
    pub fn urgent() -> Self {
        let mut config = Self::classic();
        config.priorities.push(PriorityDef::new("urgent", "Urgent"));
        config
    }

    /// Five statuses with a review stage
    pub fn review() -> Self {
        let mut config = Self::classic();
        config.statuses = vec![
            StatusDef::new("backlog", "Backlog").advances_to("in-progress", "Start"),
            StatusDef::new("in-progress", "In Progress").advances_to("review", "Submit"),
            StatusDef::new("review", "Review").advances_to("done", "Approve"),
            StatusDef::new("blocked", "Blocked").advances_to("in-progress", "Unblock"),
            StatusDef::new("done", "Done"),
        ];
        config
    }

    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Classic => Self::classic(),
            Preset::Urgent => Self::urgent(),
            Preset::Review => Self::review(),
        }
    }

    /// Overlay `raw` on its preset and validate the result
    pub fn resolve(raw: RawBoardConfig) -> Result<Self> {
        let mut config = Self::preset(raw.preset.unwrap_or_default());

        if let Some(storage_key) = raw.storage_key {
            config.storage_key = storage_key;
        }
        if let Some(statuses) = raw.statuses {
            // A new status list without an explicit default starts at its first entry
            if raw.default_status.is_none() {
                if let Some(first) = statuses.first() {
                    config.default_status = first.id.clone();
                }
            }
            config.statuses = statuses;
        }
        if let Some(terminal) = raw.terminal_status {
            config.terminal_status = terminal;
        }
        if let Some(default_status) = raw.default_status {
            config.default_status = default_status;
        }
        if let Some(priorities) = raw.priorities {
            config.priorities = priorities;
        }
        if let Some(default_priority) = raw.default_priority {
            config.default_priority = default_priority;
        }
        if let Some(days) = raw.due_soon_days {
            config.due_soon_days = days;
        }

        config.validate()?;
        Ok(config)
    }

    /// Build the layered figment: files in order, then `TASKBOARD_*` env vars.
    ///
    /// Files that do not exist are skipped.
    pub fn figment(files: &[PathBuf]) -> Result<Figment> {
        let mut figment = Figment::new();

        for path in files {
            if !path.exists() {
                trace!("Skipping missing config file: {}", path.display());
                continue;
            }
            debug!("Loading config file: {}", path.display());
            figment = figment.merge(file_provider(path)?);
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extract and validate a config from a prepared figment
    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let raw: RawBoardConfig = figment.extract()?;
        Self::resolve(raw)
    }

    /// Load from the given files plus the environment
    pub fn load(files: &[PathBuf]) -> Result<Self> {
        Self::load_with_preset(files, None)
    }

    /// Like [`load`](Self::load), with `preset` taking precedence over every source
    pub fn load_with_preset(files: &[PathBuf], preset: Option<Preset>) -> Result<Self> {
        let mut figment = Self::figment(files)?;
        if let Some(preset) = preset {
            figment = figment.merge(Serialized::default("preset", preset));
        }
        let config = Self::from_figment(&figment)?;
        debug!(
            "Loaded board config with {} statuses and {} priorities",
            config.statuses.len(),
            config.priorities.len()
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(BoardError::invalid_config("storage_key must not be empty"));
        }
        if self.statuses.is_empty() {
            return Err(BoardError::invalid_config("at least one status is required"));
        }
        if self.priorities.is_empty() {
            return Err(BoardError::invalid_config(
                "at least one priority is required",
            ));
        }

        let mut seen = HashSet::new();
        for status in &self.statuses {
            if status.id.as_str().trim().is_empty() {
                return Err(BoardError::invalid_config("status ids must not be empty"));
            }
            if !seen.insert(status.id.as_str()) {
                return Err(BoardError::invalid_config(format!(
                    "duplicate status '{}'",
                    status.id
                )));
            }
        }
        for status in &self.statuses {
            if let Some(next) = &status.next {
                if next == &status.id {
                    return Err(BoardError::invalid_config(format!(
                        "status '{}' advances to itself",
                        status.id
                    )));
                }
                if !seen.contains(next.as_str()) {
                    return Err(BoardError::invalid_config(format!(
                        "status '{}' advances to unknown status '{next}'",
                        status.id
                    )));
                }
            }
        }

        match self.status(self.terminal_status.as_str()) {
            None => {
                return Err(BoardError::invalid_config(format!(
                    "terminal status '{}' is not a configured status",
                    self.terminal_status
                )))
            }
            Some(def) if def.next.is_some() => {
                return Err(BoardError::invalid_config(format!(
                    "terminal status '{}' must not advance",
                    self.terminal_status
                )))
            }
            Some(_) => {}
        }
        if !self.is_status(self.default_status.as_str()) {
            return Err(BoardError::invalid_config(format!(
                "default status '{}' is not a configured status",
                self.default_status
            )));
        }

        let mut seen = HashSet::new();
        for priority in &self.priorities {
            if priority.id.as_str().trim().is_empty() {
                return Err(BoardError::invalid_config("priority ids must not be empty"));
            }
            if !seen.insert(priority.id.as_str()) {
                return Err(BoardError::invalid_config(format!(
                    "duplicate priority '{}'",
                    priority.id
                )));
            }
        }
        if !seen.contains(self.default_priority.as_str()) {
            return Err(BoardError::invalid_config(format!(
                "default priority '{}' is not a configured priority",
                self.default_priority
            )));
        }

        Ok(())
    }

    // =========================================================================
    // Statuses
    // =========================================================================

    /// Statuses in column order
    pub fn statuses(&self) -> &[StatusDef] {
        &self.statuses
    }

    pub fn status(&self, id: &str) -> Option<&StatusDef> {
        self.statuses.iter().find(|s| s.id == id)
    }

    pub fn is_status(&self, id: &str) -> bool {
        self.status(id).is_some()
    }

    /// Resolve user input to a configured status
    pub fn parse_status(&self, id: &str) -> Result<Status> {
        self.status(id.trim())
            .map(|s| s.id.clone())
            .ok_or_else(|| BoardError::UnknownStatus {
                status: id.to_string(),
            })
    }

    /// Fallback for new tasks, pending legacy records and unreadable statuses
    pub fn default_status(&self) -> &Status {
        &self.default_status
    }

    pub fn terminal_status(&self) -> &Status {
        &self.terminal_status
    }

    pub fn is_terminal(&self, status: &Status) -> bool {
        &self.terminal_status == status
    }

    /// Next status in the advance chain, if any
    pub fn next_status(&self, status: &Status) -> Option<&Status> {
        self.status(status.as_str()).and_then(|s| s.next.as_ref())
    }

    pub fn status_label<'a>(&'a self, status: &'a Status) -> &'a str {
        self.status(status.as_str())
            .map(|s| s.label.as_str())
            .unwrap_or_else(|| status.as_str())
    }

    // =========================================================================
    // Priorities
    // =========================================================================

    /// Priorities from lowest to highest rank
    pub fn priorities(&self) -> &[PriorityDef] {
        &self.priorities
    }

    pub fn is_priority(&self, id: &str) -> bool {
        self.priorities.iter().any(|p| p.id == id)
    }

    /// Resolve user input to a configured priority
    pub fn parse_priority(&self, id: &str) -> Result<Priority> {
        let id = id.trim();
        self.priorities
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.id.clone())
            .ok_or_else(|| BoardError::UnknownPriority {
                priority: id.to_string(),
            })
    }

    /// Rank of a priority; higher is more important. Unknown priorities rank lowest.
    pub fn priority_rank(&self, priority: &Priority) -> usize {
        self.priorities
            .iter()
            .position(|p| &p.id == priority)
            .map(|idx| idx + 1)
            .unwrap_or(0)
    }

    pub fn default_priority(&self) -> &Priority {
        &self.default_priority
    }

    // =========================================================================
    // Misc
    // =========================================================================

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Window, in days from today, in which an open task counts as due soon
    pub fn due_soon_days(&self) -> u32 {
        self.due_soon_days
    }

    /// Render the resolved configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml_ng::to_string(self).map_err(|e| BoardError::invalid_config(e.to_string()))
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::classic()
    }
}

fn file_provider(path: &Path) -> Result<Figment> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some("yaml") | Some("yml") => Ok(Figment::from(Yaml::file(path))),
        Some("toml") => Ok(Figment::from(Toml::file(path))),
        Some("json") => Ok(Figment::from(Json::file(path))),
        _ => Err(BoardError::invalid_config(format!(
            "unsupported config file format: {}",
            path.display()
        ))),
    }
}
