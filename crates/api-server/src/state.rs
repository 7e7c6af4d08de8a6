//! Application state

use std::path::PathBuf;
use std::sync::Arc;

use crate::store::{self, FileTaskStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    task_store: FileTaskStore,
    api_key: String,
}

impl AppState {
    /// Create a new AppState with the given data directory and shared key
    pub async fn new(data_dir: PathBuf, api_key: impl Into<String>) -> store::Result<Self> {
        let tasks_path = data_dir.join("tasks.json");
        let task_store = FileTaskStore::new(tasks_path).await?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                task_store,
                api_key: api_key.into(),
            }),
        })
    }

    /// Get reference to the task store
    pub fn task_store(&self) -> &FileTaskStore {
        &self.inner.task_store
    }

    /// Whether a presented key matches the configured one
    pub fn accepts_key(&self, presented: &str) -> bool {
        !self.inner.api_key.is_empty() && presented == self.inner.api_key
    }
}
