//! Store actor and its handle
//!
//! Every REST call runs in its own spawned task. Its completion is sent back
//! to the actor and applied there, so the task list is mutated by one
//! completion at a time.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::state::{StoreSnapshot, TaskListState};
use crate::task::{SortOption, Task, TaskFilter, TaskService};
use crate::{Error, Result};

const COMMAND_BUFFER: usize = 64;

/// Failure of a store operation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The service call failed; the error is also recorded in the snapshot
    #[error(transparent)]
    Service(#[from] Error),

    /// The store actor is no longer running
    #[error("Task store has shut down")]
    Closed,
}

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    Refresh { reply: Reply<()> },
    Create { task: Task, reply: Reply<Task> },
    Update { task: Task, reply: Reply<Task> },
    Delete { id: String, reply: Reply<()> },
    SetFilters { filter: TaskFilter, reply: Reply<()> },
    SetSort { sort: SortOption, reply: Reply<()> },
}

enum Completion {
    Listed {
        seq: u64,
        result: Result<Vec<Task>>,
        reply: Reply<()>,
    },
    Created {
        result: Result<Task>,
        reply: Reply<Task>,
    },
    Updated {
        result: Result<Task>,
        reply: Reply<Task>,
    },
    Deleted {
        id: String,
        result: Result<()>,
        reply: Reply<()>,
    },
}

/// The actor owning the task list
pub struct TaskStore {
    service: Arc<dyn TaskService>,
    state: TaskListState,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    publisher: watch::Sender<StoreSnapshot>,
}

impl TaskStore {
    /// Start a store on the current tokio runtime
    pub fn spawn(service: Arc<dyn TaskService>) -> StoreHandle {
        Self::spawn_with_sort(service, SortOption::default())
    }

    /// Start a store with an initial sort order
    pub fn spawn_with_sort(service: Arc<dyn TaskService>, sort: SortOption) -> StoreHandle {
        let state = TaskListState::new(sort);
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (publisher, snapshot) = watch::channel(state.snapshot());

        let store = Self {
            service,
            state,
            commands,
            completions_tx,
            completions_rx,
            publisher,
        };
        tokio::spawn(store.run());

        StoreHandle {
            commands: commands_tx,
            snapshot,
        }
    }

    async fn run(mut self) {
        debug!("Task store started");

        loop {
            tokio::select! {
                biased;

                Some(completion) = self.completions_rx.recv() => self.complete(completion),
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }
        }

        // Every handle is gone; let outstanding requests land before exiting.
        while self.state.in_flight() > 0 {
            match self.completions_rx.recv().await {
                Some(completion) => self.complete(completion),
                None => break,
            }
        }

        debug!("Task store stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Refresh { reply } => self.start_refresh(reply),
            Command::SetFilters { filter, reply } => {
                debug!(?filter, "Changing task filters");
                self.state.set_filter(filter);
                self.start_refresh(reply);
            }
            Command::SetSort { sort, reply } => {
                debug!(%sort, "Changing task sort order");
                self.state.set_sort(sort);
                self.publish();
                let _ = reply.send(Ok(()));
            }
            Command::Create { task, reply } => {
                self.begin();
                let service = Arc::clone(&self.service);
                let tx = self.completions_tx.clone();
                tokio::spawn(async move {
                    let result = service.create(&task).await;
                    let _ = tx.send(Completion::Created { result, reply });
                });
            }
            Command::Update { task, reply } => {
                self.begin();
                let service = Arc::clone(&self.service);
                let tx = self.completions_tx.clone();
                tokio::spawn(async move {
                    let result = service.update(&task).await;
                    let _ = tx.send(Completion::Updated { result, reply });
                });
            }
            Command::Delete { id, reply } => {
                self.begin();
                let service = Arc::clone(&self.service);
                let tx = self.completions_tx.clone();
                tokio::spawn(async move {
                    let result = service.delete(&id).await;
                    let _ = tx.send(Completion::Deleted { id, result, reply });
                });
            }
        }
    }

    fn start_refresh(&mut self, reply: Reply<()>) {
        let seq = self.state.next_refresh();
        self.begin();

        let filter = self.state.filter().clone();
        debug!(seq, ?filter, "Refreshing task list");

        let service = Arc::clone(&self.service);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = service.list(&filter).await;
            let _ = tx.send(Completion::Listed { seq, result, reply });
        });
    }

    fn complete(&mut self, completion: Completion) {
        self.state.end_request();

        match completion {
            Completion::Listed { seq, result, reply } => {
                if !self.state.is_current_refresh(seq) {
                    debug!(seq, "Discarding stale task list response");
                    let _ = reply.send(result.map(|_| ()));
                } else {
                    let outcome = match result {
                        Ok(tasks) => {
                            info!(count = tasks.len(), "Task list refreshed");
                            self.state.replace_all(tasks);
                            Ok(())
                        }
                        Err(e) => Err(self.fail("refresh", e)),
                    };
                    let _ = reply.send(outcome);
                }
            }
            Completion::Created { result, reply } => {
                let outcome = match result {
                    Ok(task) => {
                        debug!(id = ?task.id, "Task created");
                        self.state.append(task.clone());
                        Ok(task)
                    }
                    Err(e) => Err(self.fail("create", e)),
                };
                let _ = reply.send(outcome);
            }
            Completion::Updated { result, reply } => {
                let outcome = match result {
                    Ok(task) => {
                        if !self.state.replace(task.clone()) {
                            debug!(id = ?task.id, "Updated task is not in the current list");
                        }
                        Ok(task)
                    }
                    Err(e) => Err(self.fail("update", e)),
                };
                let _ = reply.send(outcome);
            }
            Completion::Deleted { id, result, reply } => {
                let outcome = match result {
                    Ok(()) => {
                        debug!(%id, "Task deleted");
                        self.state.remove(&id);
                        Ok(())
                    }
                    Err(e) => Err(self.fail("delete", e)),
                };
                let _ = reply.send(outcome);
            }
        }

        self.publish();
    }

    fn begin(&mut self) {
        self.state.begin_request();
        self.publish();
    }

    fn fail(&mut self, operation: &str, error: Error) -> Error {
        warn!(operation, error = %error, "Task operation failed");
        self.state.record_error(error.clone());
        error
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.snapshot());
    }
}

/// Cloneable handle to a running [`TaskStore`]
///
/// Each operation resolves once the server has answered and the result has
/// been applied to the list. Dropping the future after the command was sent
/// does not cancel the request.
#[derive(Clone)]
pub struct StoreHandle {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<StoreSnapshot>,
}

impl StoreHandle {
    /// Re-fetch the list with the current filters
    pub async fn refresh(&self) -> std::result::Result<(), StoreError> {
        self.request(|reply| Command::Refresh { reply }).await
    }

    /// Create a task and append the server's copy to the list
    pub async fn create(&self, task: Task) -> std::result::Result<Task, StoreError> {
        self.request(|reply| Command::Create { task, reply }).await
    }

    /// Update a task and replace its entry in the list
    pub async fn update(&self, task: Task) -> std::result::Result<Task, StoreError> {
        self.request(|reply| Command::Update { task, reply }).await
    }

    /// Delete a task and drop it from the list
    pub async fn delete(&self, id: impl Into<String>) -> std::result::Result<(), StoreError> {
        let id = id.into();
        self.request(|reply| Command::Delete { id, reply }).await
    }

    /// Change the server-side filters and refresh
    pub async fn set_filters(&self, filter: TaskFilter) -> std::result::Result<(), StoreError> {
        self.request(|reply| Command::SetFilters { filter, reply })
            .await
    }

    /// Re-sort the current list locally
    pub async fn set_sort(&self, sort: SortOption) -> std::result::Result<(), StoreError> {
        self.request(|reply| Command::SetSort { sort, reply }).await
    }

    /// Current published state
    pub fn snapshot(&self) -> StoreSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshot.clone()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> std::result::Result<T, StoreError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| StoreError::Closed)?;
        let result = response.await.map_err(|_| StoreError::Closed)?;
        Ok(result?)
    }
}
