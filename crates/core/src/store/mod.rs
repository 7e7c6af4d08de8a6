//! Task store
//!
//! Holds the last fetched task list, derives the sorted display list and
//! reconciles server-confirmed mutations. State lives in a single actor task;
//! [`StoreHandle`] is the cloneable front door.

mod actor;
mod state;

pub use actor::{StoreError, StoreHandle, TaskStore};
pub use state::{StoreSnapshot, TaskListState};
