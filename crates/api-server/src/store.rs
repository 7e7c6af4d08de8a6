//! File-based task storage
//!
//! Stores tasks as JSON in a file on disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use taskapp_core::task::{Task, TaskFilter};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// A persisted task with server-side timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    #[serde(flatten)]
    pub task: Task,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredTask {
    fn id(&self) -> &str {
        self.task.id.as_deref().unwrap_or_default()
    }
}

/// File-based task store using JSON
pub struct FileTaskStore {
    /// Path to the JSON file
    path: PathBuf,
    /// In-memory cache of tasks keyed by id
    cache: RwLock<HashMap<String, StoredTask>>,
    /// Held from snapshot to write so the file always ends on the newest snapshot
    write_lock: Mutex<()>,
}

impl FileTaskStore {
    /// Create a new FileTaskStore
    ///
    /// If the file doesn't exist, it will be created on first write.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let cache = if path.exists() {
            let content = tokio::fs::read_to_string(&path).await?;
            let tasks: Vec<StoredTask> = serde_json::from_str(&content)?;
            tasks
                .into_iter()
                .map(|t| (t.id().to_string(), t))
                .collect()
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            cache: RwLock::new(cache),
            write_lock: Mutex::new(()),
        })
    }

    /// Persist the cache to disk
    async fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let content = {
            let cache = self.cache.read().await;
            let tasks: Vec<&StoredTask> = cache.values().collect();
            serde_json::to_string_pretty(&tasks)?
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    /// Tasks matching `filter`, oldest first
    pub async fn list(&self, filter: &TaskFilter) -> Vec<StoredTask> {
        let cache = self.cache.read().await;
        let mut tasks: Vec<StoredTask> = cache
            .values()
            .filter(|t| filter.matches(&t.task))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        tasks
    }

    pub async fn count(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn get(&self, id: &str) -> Option<StoredTask> {
        self.cache.read().await.get(id).cloned()
    }

    /// Store a new task under a freshly generated id
    pub async fn create(&self, mut task: Task) -> Result<StoredTask> {
        let id = Uuid::new_v4().simple().to_string();
        task.id = Some(id.clone());

        let now = Utc::now();
        let stored = StoredTask {
            task,
            created_at: now,
            updated_at: now,
        };
        self.cache.write().await.insert(id, stored.clone());
        self.persist().await?;
        Ok(stored)
    }

    /// Replace the task with the same id, keeping its creation time
    pub async fn update(&self, task: Task) -> Result<StoredTask> {
        let id = task.id.clone().unwrap_or_default();
        let stored = {
            let mut cache = self.cache.write().await;
            let entry = cache
                .get_mut(&id)
                .ok_or_else(|| StoreError::TaskNotFound(id.clone()))?;
            entry.task = task;
            entry.updated_at = Utc::now();
            entry.clone()
        };
        self.persist().await?;
        Ok(stored)
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let removed = self.cache.write().await.remove(id).is_some();
        if removed {
            self.persist().await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskapp_core::task::{Priority, Status};
    use tempfile::TempDir;

    async fn create_test_store() -> (FileTaskStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let store = FileTaskStore::new(&path).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let (store, _temp) = create_test_store().await;

        let created = store.create(Task::new("Test task")).await.unwrap();

        let id = created.task.id.clone().unwrap();
        assert_eq!(id.len(), 32);
        assert_eq!(store.get(&id).await.unwrap().task.title, "Test task");
    }

    #[tokio::test]
    async fn test_list_filters_and_orders() {
        let (store, _temp) = create_test_store().await;

        store
            .create(Task::new("first").with_priority(Priority::High))
            .await
            .unwrap();
        store
            .create(Task::new("second").with_priority(Priority::Low))
            .await
            .unwrap();
        store
            .create(
                Task::new("third")
                    .with_priority(Priority::High)
                    .with_status(Status::Completed),
            )
            .await
            .unwrap();

        let all = store.list(&TaskFilter::default()).await;
        let titles: Vec<_> = all.iter().map(|t| t.task.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);

        let high = store
            .list(&TaskFilter::new(Some(Priority::High), None))
            .await;
        assert_eq!(high.len(), 2);

        let high_done = store
            .list(&TaskFilter::new(Some(Priority::High), Some(Status::Completed)))
            .await;
        assert_eq!(high_done.len(), 1);
        assert_eq!(high_done[0].task.title, "third");
    }

    #[tokio::test]
    async fn test_update_task() {
        let (store, _temp) = create_test_store().await;
        let created = store.create(Task::new("Original title")).await.unwrap();

        let mut task = created.task.clone();
        task.title = "Updated title".to_string();
        let updated = store.update(task).await.unwrap();

        assert_eq!(updated.task.title, "Updated title");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_nonexistent_task() {
        let (store, _temp) = create_test_store().await;

        let result = store.update(Task::new("ghost").with_id("nope")).await;
        match result {
            Err(StoreError::TaskNotFound(id)) => assert_eq!(id, "nope"),
            other => panic!("Expected TaskNotFound error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (store, _temp) = create_test_store().await;
        let created = store.create(Task::new("Task to delete")).await.unwrap();
        let id = created.task.id.unwrap();

        assert!(store.delete(&id).await.unwrap());
        assert!(store.get(&id).await.is_none());
        assert!(!store.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_creates_all_reach_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");
        let store = std::sync::Arc::new(FileTaskStore::new(&path).await.unwrap());

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = std::sync::Arc::clone(&store);
                tokio::spawn(async move { store.create(Task::new(format!("task {}", i))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reloaded = FileTaskStore::new(&path).await.unwrap();
        assert_eq!(reloaded.count().await, 50);
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        let id = {
            let store = FileTaskStore::new(&path).await.unwrap();
            let task = Task::new("Persistent task")
                .with_description("Should survive reload")
                .with_priority(Priority::High);
            store.create(task).await.unwrap().task.id.unwrap()
        };

        let store = FileTaskStore::new(&path).await.unwrap();
        let task = store.get(&id).await.unwrap().task;
        assert_eq!(task.title, "Persistent task");
        assert_eq!(task.description, "Should survive reload");
        assert_eq!(task.priority, Priority::High);
    }
}
