//! Task module
//!
//! This module contains task-related types and logic.

mod model;
mod service;
mod sort;

pub use model::*;
pub use service::TaskService;
pub use sort::{sort_tasks, sorted, SortOption, UnknownSortOption};
