//! In-memory `TaskService` used by unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::task::{Task, TaskFilter, TaskService};
use crate::{Error, Result};

#[derive(Default)]
pub struct MemoryService {
    tasks: Mutex<Vec<Task>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    failure: Mutex<Option<Error>>,
}

impl MemoryService {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    /// Make every following call fail with `error`
    pub fn fail_with(&self, error: Error) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    /// Number of calls that reached the service
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    fn enter(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TaskService for MemoryService {
    async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.enter()?;
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    async fn create(&self, task: &Task) -> Result<Task> {
        self.enter()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut created = task.clone();
        created.id = Some(format!("task-{}", id));
        self.tasks.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(&self, task: &Task) -> Result<Task> {
        let id = task.require_id()?;
        self.enter()?;
        let mut tasks = self.tasks.lock().unwrap();
        let slot = tasks
            .iter_mut()
            .find(|t| t.id.as_deref() == Some(id))
            .ok_or(Error::NotFound)?;
        *slot = task.clone();
        Ok(task.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.enter()?;
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id.as_deref() != Some(id));
        if tasks.len() == before {
            return Err(Error::NotFound);
        }
        Ok(())
    }
}
