//! Schema migration from older store layouts.
//!
//! The current generation lives under the configured storage key. Older
//! generations are described by [`SchemaAdapter`]s, consulted newest first
//! and only when the current key is absent. A present current key, even an
//! empty collection, is authoritative.
//!
//! ## Field mapping: `todo.tasks.v1` (schema 1)
//!
//! | schema 1 | current |
//! |----------|---------|
//! | `id`, `title`, `description`, `createdAt`, `updatedAt` | copied |
//! | `status: "completed"` | configured terminal status |
//! | any other `status` | configured default (initial) status |
//! | (absent) | `priority`: configured default |
//! | (absent) | `dueDate`: none, `tags`: empty |
//! | array position | `order` |

use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::record::normalize_all;
use crate::store::KeyValueStore;
use crate::types::Task;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

/// Schema version of records written by this crate
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Adapter from one superseded store generation to the current record shape
pub trait SchemaAdapter {
    /// Key this generation was stored under
    fn key(&self) -> &str;

    /// Schema version number, for diagnostics
    fn version(&self) -> u32;

    /// Map one legacy record (a JSON object) to a current-shape record.
    ///
    /// Fields the legacy schema lacks may be left out; [`normalize`] fills them.
    ///
    /// [`normalize`]: crate::record::normalize
    fn upgrade(&self, record: &Value, index: usize, config: &BoardConfig) -> Value;
}

/// The single-list todo app that preceded the board
#[derive(Debug, Clone, Copy, Default)]
pub struct TodoV1;

impl TodoV1 {
    pub const KEY: &'static str = "todo.tasks.v1";
}

impl SchemaAdapter for TodoV1 {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn version(&self) -> u32 {
        1
    }

    fn upgrade(&self, record: &Value, index: usize, config: &BoardConfig) -> Value {
        let mut out = Map::new();
        for field in ["id", "title", "description", "createdAt", "updatedAt"] {
            if let Some(value) = record.get(field) {
                out.insert(field.to_string(), value.clone());
            }
        }

        let status = if record.get("status").and_then(Value::as_str) == Some("completed") {
            config.terminal_status()
        } else {
            config.default_status()
        };
        out.insert("status".into(), json!(status));
        out.insert("priority".into(), json!(config.default_priority()));
        out.insert("dueDate".into(), json!(""));
        out.insert("tags".into(), json!([]));
        out.insert("order".into(), json!(index));

        Value::Object(out)
    }
}

/// Where a loaded collection came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Read from the current key
    Current,
    /// Upgraded from a superseded key
    Legacy { key: String, version: u32 },
    /// Nothing usable was found; see the migration issues
    Empty,
    /// The current key exists in an unknown state: the store failed to read it
    Unreadable,
}

/// Result of a migration run
#[derive(Debug)]
pub struct Migration {
    /// Normalized records, not yet reindexed
    pub tasks: Vec<Task>,
    pub source: SchemaSource,
    /// Recovered problems: corrupt values, unreadable keys
    pub issues: Vec<BoardError>,
}

impl Migration {
    /// True when the collection must be persisted under the current key
    pub fn needs_write_back(&self) -> bool {
        matches!(self.source, SchemaSource::Legacy { .. })
    }

    fn empty(issues: Vec<BoardError>) -> Self {
        Self {
            tasks: Vec::new(),
            source: SchemaSource::Empty,
            issues,
        }
    }
}

/// Chain of schema adapters, newest first
pub struct Migrator {
    adapters: Vec<Box<dyn SchemaAdapter>>,
}

impl Migrator {
    /// A migrator that knows no legacy generations
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Append an adapter for a generation older than all registered ones
    pub fn with_adapter(mut self, adapter: impl SchemaAdapter + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    /// Legacy keys in lookup order
    pub fn legacy_keys(&self) -> impl Iterator<Item = &str> {
        self.adapters.iter().map(|a| a.key())
    }

    /// Read the collection from `store`, upgrading a legacy generation if needed.
    ///
    /// Never fails; problems are collected in [`Migration::issues`]. Does not
    /// write: the caller persists when [`Migration::needs_write_back`].
    pub fn run<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        config: &BoardConfig,
        now: DateTime<Utc>,
    ) -> Migration {
        let current_key = config.storage_key();

        match store.get(current_key) {
            Ok(Some(bytes)) => {
                return match decode_records(&bytes) {
                    Ok(records) => {
                        debug!(
                            "Loaded {} records from current key '{current_key}'",
                            records.len()
                        );
                        Migration {
                            tasks: normalize_all(&records, config, now),
                            source: SchemaSource::Current,
                            issues: Vec::new(),
                        }
                    }
                    Err(message) => {
                        let err = BoardError::corrupt(current_key, message);
                        warn!("Discarding stored tasks: {err}");
                        Migration::empty(vec![err])
                    }
                };
            }
            Ok(None) => {}
            Err(err) => {
                warn!("Could not read '{current_key}': {err}");
                return Migration {
                    tasks: Vec::new(),
                    source: SchemaSource::Unreadable,
                    issues: vec![err],
                };
            }
        }

        let mut issues = Vec::new();
        for adapter in &self.adapters {
            let key = adapter.key();
            let bytes = match store.get(key) {
                Ok(Some(bytes)) => bytes,
                Ok(None) => continue,
                Err(err) => {
                    warn!("Could not read legacy key '{key}': {err}");
                    issues.push(err);
                    continue;
                }
            };

            let records = match decode_records(&bytes) {
                Ok(records) => records,
                Err(message) => {
                    let err = BoardError::corrupt(key, message);
                    warn!("Discarding legacy tasks: {err}");
                    issues.push(err);
                    return Migration::empty(issues);
                }
            };

            let upgraded: Vec<Value> = records
                .iter()
                .enumerate()
                .filter(|(_, record)| record.is_object())
                .map(|(index, record)| adapter.upgrade(record, index, config))
                .collect();

            info!(
                "Migrating {} tasks from '{key}' (schema v{}) to '{current_key}' (schema v{CURRENT_SCHEMA_VERSION})",
                upgraded.len(),
                adapter.version()
            );

            return Migration {
                tasks: normalize_all(&upgraded, config, now),
                source: SchemaSource::Legacy {
                    key: key.to_string(),
                    version: adapter.version(),
                },
                issues,
            };
        }

        debug!("No stored tasks found");
        Migration::empty(issues)
    }
}

impl Default for Migrator {
    /// All built-in legacy generations
    fn default() -> Self {
        Self::new().with_adapter(TodoV1)
    }
}

/// Decode a stored value as a JSON array of records
fn decode_records(bytes: &[u8]) -> std::result::Result<Vec<Value>, String> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    match value {
        Value::Array(records) => Ok(records),
        other => Err(format!("expected a JSON array, found {}", kind(&other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap()
    }

    /// Stand-in for a generation older than `todo.tasks.v1`
    struct Ancient;

    impl SchemaAdapter for Ancient {
        fn key(&self) -> &str {
            "todos"
        }

        fn version(&self) -> u32 {
            0
        }

        fn upgrade(&self, record: &Value, _index: usize, _config: &BoardConfig) -> Value {
            json!({ "title": record.get("text").cloned().unwrap_or(Value::Null) })
        }
    }

    #[test]
    fn test_current_key_is_authoritative_even_when_empty() {
        let store = MemoryStore::new()
            .with_value("kanban.tasks.v1", "[]")
            .with_value(TodoV1::KEY, r#"[{"title":"old"}]"#);

        let migration = Migrator::default().run(&store, &BoardConfig::classic(), now());
        assert_eq!(migration.source, SchemaSource::Current);
        assert!(migration.tasks.is_empty());
        assert!(!migration.needs_write_back());
    }

    #[test]
    fn test_todo_v1_field_mapping() {
        let store = MemoryStore::new().with_value(
            TodoV1::KEY,
            r#"[
                {"id":"a","title":"Done thing","status":"completed","createdAt":"2025-01-01T00:00:00Z"},
                {"id":"b","title":"Open thing","description":"d","status":"pending","priority":"high"}
            ]"#,
        );

        let migration = Migrator::default().run(&store, &BoardConfig::classic(), now());
        assert_eq!(
            migration.source,
            SchemaSource::Legacy {
                key: TodoV1::KEY.into(),
                version: 1
            }
        );
        assert!(migration.needs_write_back());

        let done = &migration.tasks[0];
        assert_eq!(done.id().as_str(), "a");
        assert_eq!(done.status(), "done");
        assert_eq!(done.priority(), "medium");
        assert_eq!(done.order(), 0);
        assert_eq!(
            done.created_at(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );

        let open = &migration.tasks[1];
        assert_eq!(open.status(), "backlog");
        assert_eq!(open.description(), "d");
        // schema 1 had no priority: a stray value is not carried over
        assert_eq!(open.priority(), "medium");
        assert_eq!(open.order(), 1);
        assert!(open.tags().is_empty());
        assert_eq!(open.created_at(), now());
    }

    #[test]
    fn test_mapping_uses_configured_statuses() {
        let store = MemoryStore::new()
            .with_value(TodoV1::KEY, r#"[{"title":"x","status":"completed"}]"#);
        let raw = crate::config::RawBoardConfig {
            statuses: Some(vec![
                crate::config::StatusDef::new("todo", "To Do").advances_to("closed", "Close"),
                crate::config::StatusDef::new("closed", "Closed"),
            ]),
            terminal_status: Some("closed".into()),
            ..Default::default()
        };
        let config = BoardConfig::resolve(raw).unwrap();

        let migration = Migrator::default().run(&store, &config, now());
        assert_eq!(migration.tasks[0].status(), "closed");
    }

    #[test]
    fn test_older_adapters_consulted_in_order() {
        let store = MemoryStore::new().with_value("todos", r#"[{"text":"very old"}]"#);
        let migrator = Migrator::default().with_adapter(Ancient);
        assert_eq!(
            migrator.legacy_keys().collect::<Vec<_>>(),
            vec![TodoV1::KEY, "todos"]
        );

        let migration = migrator.run(&store, &BoardConfig::classic(), now());
        assert_eq!(
            migration.source,
            SchemaSource::Legacy {
                key: "todos".into(),
                version: 0
            }
        );
        assert_eq!(migration.tasks[0].title(), "very old");

        // a newer legacy key wins over an older one
        let store = store.with_value(TodoV1::KEY, r#"[{"title":"newer"}]"#);
        let migration = migrator.run(&store, &BoardConfig::classic(), now());
        assert_eq!(migration.tasks[0].title(), "newer");
    }

    #[test]
    fn test_corrupt_current_value_discarded() {
        for bad in ["{not json", r#"{"tasks": []}"#, "42", ""] {
            let store = MemoryStore::new()
                .with_value("kanban.tasks.v1", bad)
                .with_value(TodoV1::KEY, r#"[{"title":"old"}]"#);

            let migration = Migrator::default().run(&store, &BoardConfig::classic(), now());
            assert_eq!(migration.source, SchemaSource::Empty, "input {bad:?}");
            assert!(migration.tasks.is_empty());
            assert!(matches!(
                migration.issues.as_slice(),
                [BoardError::CorruptState { .. }]
            ));
            assert!(!migration.needs_write_back());
        }
    }

    #[test]
    fn test_corrupt_legacy_value_discarded() {
        let store = MemoryStore::new().with_value(TodoV1::KEY, r#"{"id":"a"}"#);
        let migration = Migrator::default().run(&store, &BoardConfig::classic(), now());
        assert_eq!(migration.source, SchemaSource::Empty);
        assert!(!migration.needs_write_back());
        assert_eq!(migration.issues.len(), 1);
        assert!(migration.issues[0]
            .to_string()
            .contains("expected a JSON array, found an object"));
    }

    /// Fails reads of one key
    struct BrokenKey(MemoryStore, &'static str);

    impl KeyValueStore for BrokenKey {
        fn get(&self, key: &str) -> crate::Result<Option<Vec<u8>>> {
            if key == self.1 {
                return Err(BoardError::store(key, "device not ready"));
            }
            self.0.get(key)
        }

        fn set(&mut self, key: &str, value: &[u8]) -> crate::Result<()> {
            self.0.set(key, value)
        }
    }

    #[test]
    fn test_unreadable_current_key_skips_legacy() {
        let store = BrokenKey(
            MemoryStore::new().with_value(TodoV1::KEY, r#"[{"title":"old"}]"#),
            "kanban.tasks.v1",
        );
        let migration = Migrator::default().run(&store, &BoardConfig::classic(), now());
        assert_eq!(migration.source, SchemaSource::Unreadable);
        assert!(migration.tasks.is_empty());
        assert!(!migration.needs_write_back());
        assert!(matches!(
            migration.issues.as_slice(),
            [BoardError::StoreUnavailable { .. }]
        ));
    }

    #[test]
    fn test_nothing_stored() {
        let migration =
            Migrator::default().run(&MemoryStore::new(), &BoardConfig::classic(), now());
        assert_eq!(migration.source, SchemaSource::Empty);
        assert!(migration.issues.is_empty());
    }
}
