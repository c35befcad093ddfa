//! Loading legacy and damaged stores through a board

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use taskboard::migrate::TodoV1;
use taskboard::{
    Board, BoardConfig, BoardError, FixedClock, MemoryStore, SchemaSource, Status,
};

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap())
}

const LEGACY: &str = r#"[
    {"id":"t-1","title":"Pay rent","description":"","status":"completed","createdAt":"2025-03-01T08:00:00.000Z"},
    {"id":"t-2","title":"Call mom","description":"sunday","status":"pending","createdAt":"2025-03-02T08:00:00.000Z","updatedAt":"2025-03-03T08:00:00.000Z"}
]"#;

fn stored(board: &Board<MemoryStore, FixedClock>) -> Value {
    serde_json::from_str(board.store().get_str("kanban.tasks.v1").unwrap()).unwrap()
}

#[test]
fn test_legacy_records_map_to_terminal_and_initial() {
    let store = MemoryStore::new().with_value(TodoV1::KEY, LEGACY);
    let board = Board::open_with_clock(BoardConfig::classic(), store, clock());

    let report = board.load_report();
    assert_eq!(
        report.source,
        SchemaSource::Legacy {
            key: "todo.tasks.v1".into(),
            version: 1
        }
    );
    assert!(report.written_back);

    let paid = board.get(&"t-1".into()).unwrap();
    assert_eq!(paid.status(), "done");
    assert_eq!(paid.priority(), "medium");
    let call = board.get(&"t-2".into()).unwrap();
    assert_eq!(call.status(), "backlog");
    assert_eq!(call.description(), "sunday");
    assert_eq!(
        call.updated_at(),
        Some(Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap())
    );

    // written back in the current shape, legacy key untouched
    let written = stored(&board);
    let records = written.as_array().unwrap();
    assert_eq!(records.len(), 2);
    for record in records {
        for field in [
            "id",
            "title",
            "description",
            "status",
            "priority",
            "tags",
            "dueDate",
            "order",
            "createdAt",
        ] {
            assert!(record.get(field).is_some(), "missing {field}");
        }
        assert_eq!(record["dueDate"], "");
    }
    assert_eq!(board.store().get_str(TodoV1::KEY), Some(LEGACY));
}

#[test]
fn test_current_collection_loads_without_write_back() {
    let store = MemoryStore::new().with_value(TodoV1::KEY, LEGACY);
    let first = Board::open_with_clock(BoardConfig::classic(), store, clock());
    let after_migration = first.store().get_str("kanban.tasks.v1").unwrap().to_string();

    let second = Board::open_with_clock(BoardConfig::classic(), first.store().clone(), clock());
    assert_eq!(second.load_report().source, SchemaSource::Current);
    assert!(!second.load_report().written_back);
    assert_eq!(second.tasks(), first.tasks());
    assert_eq!(
        second.store().get_str("kanban.tasks.v1").unwrap(),
        after_migration
    );
}

#[test]
fn test_empty_current_key_blocks_migration() {
    let store = MemoryStore::new()
        .with_value("kanban.tasks.v1", "[]")
        .with_value(TodoV1::KEY, LEGACY);
    let board = Board::open_with_clock(BoardConfig::classic(), store, clock());
    assert!(board.tasks().is_empty());
    assert_eq!(board.load_report().source, SchemaSource::Current);
}

#[test_log::test]
fn test_corrupt_current_value_starts_empty_and_recovers() {
    let store = MemoryStore::new().with_value("kanban.tasks.v1", "{\"oops\"");
    let mut board = Board::open_with_clock(BoardConfig::classic(), store, clock());

    assert!(board.tasks().is_empty());
    let issues = &board.load_report().issues;
    assert_eq!(issues.len(), 1);
    assert!(matches!(issues[0], BoardError::CorruptState { .. }));
    assert!(issues[0].is_recoverable());

    // the corrupt value is replaced by the next write
    board
        .create(taskboard::NewTask::new("fresh start"))
        .unwrap();
    assert_eq!(stored(&board).as_array().unwrap().len(), 1);
}

#[test]
fn test_drifted_orders_are_healed_on_load() {
    let store = MemoryStore::new().with_value(
        "kanban.tasks.v1",
        r#"[
            {"id":"a","title":"a","status":"in-progress","order":5},
            {"id":"b","title":"b","status":"in-progress","order":2},
            {"id":"c","title":"c","status":"in-progress"},
            {"id":"a","title":"dupe","status":"nonsense","order":"x"}
        ]"#,
    );
    let board = Board::open_with_clock(BoardConfig::classic(), store, clock());

    let column: Vec<&str> = board
        .view()
        .column("in-progress")
        .unwrap()
        .tasks
        .iter()
        .map(|t| t.title())
        .collect();
    // "c" falls back to its index, 2, and ties with "b": collection order wins
    assert_eq!(column, vec!["b", "c", "a"]);

    let dupe = board.tasks().iter().find(|t| t.title() == "dupe").unwrap();
    assert_ne!(dupe.id().as_str(), "a");
    assert_eq!(dupe.status(), &Status::from("backlog"));
    assert_eq!(dupe.order(), 0);
}

#[test]
fn test_created_at_survives_migration() {
    let store = MemoryStore::new().with_value(TodoV1::KEY, LEGACY);
    let board = Board::open_with_clock(BoardConfig::classic(), store, clock());
    let expected: DateTime<Utc> = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
    assert_eq!(board.get(&"t-1".into()).unwrap().created_at(), expected);
}
