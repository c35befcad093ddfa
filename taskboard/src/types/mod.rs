//! Core types for the task board engine

mod ids;
mod tags;
mod task;
mod workflow;

pub use ids::TaskId;
pub use tags::Tags;
pub use task::Task;
pub use workflow::{Priority, Status};

pub(crate) use task::due_date;
