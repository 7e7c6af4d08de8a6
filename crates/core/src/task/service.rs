//! Task service trait
//!
//! Defines the interface the task store uses to reach the remote task list.

use async_trait::async_trait;

use super::model::{Task, TaskFilter};
use crate::Result;

/// Remote CRUD operations on tasks
///
/// Implementations make a single attempt per call and never retry; every
/// failure is reported through [`crate::Error`].
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Fetch the tasks matching the present filters
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// Persist a new task and return the server's copy, id included
    async fn create(&self, task: &Task) -> Result<Task>;

    /// Replace a persisted task; fails with `InvalidData` when `task.id` is absent
    async fn update(&self, task: &Task) -> Result<Task>;

    /// Delete a task by id
    async fn delete(&self, id: &str) -> Result<()>;
}
