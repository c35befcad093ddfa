//! Personal task board engine
//!
//! This crate holds the core of a task board: where each task sits within its
//! status column, how moves and status transitions change that position, how
//! filtered and sorted views are derived without touching it, and how stored
//! records are decoded and migrated across schema generations.
//!
//! ## Overview
//!
//! - **Dense manual order** - Every status group carries a 0-based, gap-free `order`
//! - **Read-only views** - Filters and sorts produce borrowed projections
//! - **Tolerant decoding** - Stored records never fail to load; bad fields get defaults
//! - **One-time migration** - Legacy keys are upgraded and written back under the current key
//! - **Configurable workflow** - Statuses, adjacency and priorities come from [`BoardConfig`]
//!
//! ## Basic Usage
//!
//! ```rust
//! use taskboard::{Board, BoardConfig, MemoryStore, NewTask, Status};
//!
//! # fn example() -> taskboard::Result<()> {
//! let mut board = Board::open(BoardConfig::classic(), MemoryStore::new());
//!
//! let first = board.create(NewTask::new("Write the changelog"))?;
//! let second = board.create(NewTask::new("Tag the release").with_priority("high"))?;
//! assert_eq!(second.order(), 0);
//!
//! // Drag the first task back to the top of the backlog
//! board.move_to(first.id(), &Status::from("backlog"), 0)?;
//! board.advance_status(second.id())?;
//!
//! let counts = board.counts();
//! assert_eq!(counts[&Status::from("in-progress")], 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Persisted Layout
//!
//! ```text
//! kanban.tasks.v1   current: JSON array of task records
//! todo.tasks.v1     legacy (schema 1): read once, never written
//! ```
//!
//! Records carry `id, title, description, status, priority, tags, dueDate,
//! order, createdAt` and, once edited, `updatedAt`.

mod board;
pub mod clock;
pub mod config;
mod error;
pub mod migrate;
pub mod ordering;
pub mod persistence;
pub mod record;
pub mod store;
pub mod types;
pub mod view;

pub use board::{Board, NewTask, TaskPatch};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BoardConfig, Preset, PriorityDef, RawBoardConfig, StatusDef};
pub use error::{BoardError, ErrorSeverity, Result, Severity};
pub use migrate::{Migrator, SchemaAdapter, SchemaSource};
pub use persistence::{LoadReport, Persistence};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use types::{Priority, Status, Tags, Task, TaskId};
pub use view::{BoardView, ColumnView, DueFilter, DueState, Filter, SortMode};
