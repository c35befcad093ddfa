//! Persistence gateway: whole-collection load and save through a store.
//!
//! `load` never fails. Missing keys, corrupt values and store errors all
//! degrade to an empty collection, and are reported in the [`LoadReport`]
//! instead of returned. `save` reports failures so the caller can keep working
//! in memory.
//!
//! When the current key could not be read at all, the gateway is detached:
//! saves are refused so a collection nobody has seen is never overwritten.
//! Each later save re-reads the key and reattaches once the key is readable
//! and absent.

use crate::config::BoardConfig;
use crate::error::{BoardError, Result};
use crate::migrate::{Migrator, SchemaSource};
use crate::ordering::reindex_all;
use crate::store::KeyValueStore;
use crate::types::Task;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// What happened during [`Persistence::load`]
#[derive(Debug)]
pub struct LoadReport {
    pub source: SchemaSource,
    /// Whether an upgraded legacy collection reached the current key
    pub written_back: bool,
    /// Recovered problems, oldest first
    pub issues: Vec<BoardError>,
}

impl LoadReport {
    /// True when nothing had to be recovered
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Gateway over a [`KeyValueStore`]
pub struct Persistence<S> {
    store: S,
    migrator: Migrator,
    healthy: bool,
    detached: bool,
}

impl<S: KeyValueStore> Persistence<S> {
    /// Gateway with all built-in legacy adapters
    pub fn new(store: S) -> Self {
        Self::with_migrator(store, Migrator::default())
    }

    pub fn with_migrator(store: S, migrator: Migrator) -> Self {
        Self {
            store,
            migrator,
            healthy: true,
            detached: false,
        }
    }

    /// Load a normalized, schema-current, reindexed collection.
    ///
    /// A collection upgraded from a legacy key is written back under the
    /// current key before returning. Legacy keys are never written.
    pub fn load(&mut self, config: &BoardConfig, now: DateTime<Utc>) -> (Vec<Task>, LoadReport) {
        let migration = self.migrator.run(&self.store, config, now);
        self.detached = migration.source == SchemaSource::Unreadable;
        if self.detached {
            warn!(
                "Keeping '{}' untouched until it can be read",
                config.storage_key()
            );
            self.healthy = false;
        }
        let needs_write_back = migration.needs_write_back();
        let mut tasks = migration.tasks;
        let mut issues = migration.issues;
        reindex_all(&mut tasks);

        let mut written_back = false;
        if needs_write_back {
            match self.save(config, &tasks) {
                Ok(()) => {
                    info!(
                        "Wrote {} migrated tasks to '{}'",
                        tasks.len(),
                        config.storage_key()
                    );
                    written_back = true;
                }
                Err(err) => {
                    warn!("Migration write-back failed, continuing in memory: {err}");
                    issues.push(err);
                }
            }
        }

        debug!("Loaded {} tasks from {:?}", tasks.len(), migration.source);
        let report = LoadReport {
            source: migration.source,
            written_back,
            issues,
        };
        (tasks, report)
    }

    /// Overwrite the current key with `tasks`.
    ///
    /// A detached gateway refuses with [`BoardError::StoreUnavailable`]
    /// unless a fresh read finds the key absent.
    pub fn save(&mut self, config: &BoardConfig, tasks: &[Task]) -> Result<()> {
        let key = config.storage_key();
        if self.detached && !self.reattach(key) {
            self.healthy = false;
            return Err(BoardError::store(
                key,
                "stored tasks were never loaded, changes stay in memory",
            ));
        }

        let bytes = serde_json::to_vec_pretty(tasks)?;
        let result = self.store.set(key, &bytes);
        self.healthy = result.is_ok();
        if result.is_ok() {
            debug!("Saved {} tasks to '{}'", tasks.len(), config.storage_key());
        }
        result
    }

    /// Whether the most recent write reached the store
    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// Whether saves are refused because the current key was unreadable
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn reattach(&mut self, key: &str) -> bool {
        match self.store.get(key) {
            Ok(None) => {
                info!("'{key}' is readable and empty, resuming saves");
                self.detached = false;
                true
            }
            Ok(Some(_)) => {
                debug!("'{key}' holds tasks this session never loaded, not overwriting");
                false
            }
            Err(err) => {
                debug!("'{key}' is still unreadable: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::TodoV1;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use serde_json::Value;
    use std::cell::Cell;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 8, 0, 0).unwrap()
    }

    /// Accepts reads, rejects every write
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            self.0.get(key)
        }

        fn set(&mut self, key: &str, _value: &[u8]) -> Result<()> {
            Err(BoardError::store(key, "read-only"))
        }
    }

    #[test]
    fn test_load_reindexes_current_collection_without_writing() {
        let store = MemoryStore::new().with_value(
            "kanban.tasks.v1",
            r#"[{"id":"a","title":"A","status":"done","order":4},
                {"id":"b","title":"B","status":"done","order":9}]"#,
        );
        let mut gateway = Persistence::new(store);
        let (tasks, report) = gateway.load(&BoardConfig::classic(), now());

        assert_eq!(report.source, SchemaSource::Current);
        assert!(!report.written_back);
        assert!(report.is_clean());
        assert_eq!(
            tasks.iter().map(|t| t.order()).collect::<Vec<_>>(),
            vec![0, 1]
        );
        // healed in memory only
        assert!(gateway
            .store()
            .get_str("kanban.tasks.v1")
            .unwrap()
            .contains(r#""order":4"#));
    }

    #[test]
    fn test_legacy_load_writes_back_and_leaves_legacy_key() {
        let legacy = r#"[{"id":"1","title":"old","status":"pending"}]"#;
        let store = MemoryStore::new().with_value(TodoV1::KEY, legacy);
        let mut gateway = Persistence::new(store);

        let (tasks, report) = gateway.load(&BoardConfig::classic(), now());
        assert!(report.written_back);
        assert_eq!(tasks.len(), 1);

        let written: Value =
            serde_json::from_str(gateway.store().get_str("kanban.tasks.v1").unwrap()).unwrap();
        assert_eq!(written[0]["id"], "1");
        assert_eq!(written[0]["status"], "backlog");
        assert_eq!(gateway.store().get_str(TodoV1::KEY), Some(legacy));

        // second load reads the current key
        let (_, report) = gateway.load(&BoardConfig::classic(), now());
        assert_eq!(report.source, SchemaSource::Current);
        assert!(!report.written_back);
    }

    #[test_log::test]
    fn test_failed_write_back_keeps_tasks_in_memory() {
        let store = ReadOnlyStore(
            MemoryStore::new().with_value(TodoV1::KEY, r#"[{"title":"old"}]"#),
        );
        let mut gateway = Persistence::new(store);

        let (tasks, report) = gateway.load(&BoardConfig::classic(), now());
        assert_eq!(tasks.len(), 1);
        assert!(!report.written_back);
        assert!(matches!(
            report.issues.as_slice(),
            [BoardError::StoreUnavailable { .. }]
        ));
        assert!(!gateway.is_healthy());
    }

    /// Fails the first `failures` reads, then behaves like the inner store
    struct StutteringStore {
        inner: MemoryStore,
        failures: Cell<usize>,
    }

    impl StutteringStore {
        fn new(inner: MemoryStore, failures: usize) -> Self {
            Self {
                inner,
                failures: Cell::new(failures),
            }
        }
    }

    impl KeyValueStore for StutteringStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            if self.failures.get() > 0 {
                self.failures.set(self.failures.get() - 1);
                return Err(BoardError::store(key, "device not ready"));
            }
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
            self.inner.set(key, value)
        }
    }

    fn one_task(config: &BoardConfig) -> Vec<Task> {
        vec![Task::new(
            "new",
            config.default_status().clone(),
            config.default_priority().clone(),
            now(),
        )]
    }

    #[test_log::test]
    fn test_unreadable_current_key_is_never_overwritten() {
        let saved = r#"[{"id":"a","title":"A"},{"id":"b","title":"B"},{"id":"c","title":"C"}]"#;
        let store = MemoryStore::new().with_value("kanban.tasks.v1", saved);
        let mut gateway = Persistence::new(StutteringStore::new(store, 1));
        let config = BoardConfig::classic();

        let (tasks, report) = gateway.load(&config, now());
        assert!(tasks.is_empty());
        assert_eq!(report.source, SchemaSource::Unreadable);
        assert!(gateway.is_detached());
        assert!(!gateway.is_healthy());

        // the read now succeeds but finds data this session never loaded
        assert!(matches!(
            gateway.save(&config, &one_task(&config)),
            Err(BoardError::StoreUnavailable { .. })
        ));
        assert!(gateway.is_detached());
        assert!(!gateway.is_healthy());
        assert_eq!(gateway.store().inner.get_str("kanban.tasks.v1"), Some(saved));

        // a fresh load sees the saved collection again
        let (tasks, report) = gateway.load(&config, now());
        assert_eq!(report.source, SchemaSource::Current);
        assert_eq!(tasks.len(), 3);
        assert!(!gateway.is_detached());
    }

    #[test_log::test]
    fn test_detached_gateway_reattaches_when_key_is_absent() {
        let mut gateway = Persistence::new(StutteringStore::new(MemoryStore::new(), 1));
        let config = BoardConfig::classic();

        let (_, report) = gateway.load(&config, now());
        assert_eq!(report.source, SchemaSource::Unreadable);

        gateway.save(&config, &one_task(&config)).unwrap();
        assert!(!gateway.is_detached());
        assert!(gateway.is_healthy());
        assert!(gateway.store().inner.get_str("kanban.tasks.v1").is_some());
    }

    #[test]
    fn test_save_round_trips_through_load() {
        let mut gateway = Persistence::new(MemoryStore::new());
        let config = BoardConfig::classic();
        let (mut tasks, _) = gateway.load(&config, now());
        assert!(tasks.is_empty());

        crate::ordering::insert_at_head(
            &mut tasks,
            Task::new(
                "write me",
                config.default_status().clone(),
                config.default_priority().clone(),
                now(),
            ),
        );
        gateway.save(&config, &tasks).unwrap();
        assert!(gateway.is_healthy());

        let (reloaded, report) = gateway.load(&config, now());
        assert_eq!(report.source, SchemaSource::Current);
        assert_eq!(reloaded, tasks);
    }
}
