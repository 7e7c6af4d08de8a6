//! In-memory task list state owned by the store actor

use serde::Serialize;

use crate::task::{sort_tasks, SortOption, Task, TaskFilter};
use crate::Error;

/// Published view of the store, cheap enough to clone on every change
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// The sorted list to display
    pub tasks: Vec<Task>,
    pub filter: TaskFilter,
    pub sort: SortOption,
    pub is_loading: bool,
    #[serde(serialize_with = "serialize_error")]
    pub last_error: Option<Error>,
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<Error>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_some(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Task list plus the derived display list
///
/// `display_tasks` is always `all_tasks` sorted by `sort`; every mutation
/// recomputes it. Mutations only happen after the server confirmed them.
#[derive(Debug, Default)]
pub struct TaskListState {
    all_tasks: Vec<Task>,
    display_tasks: Vec<Task>,
    filter: TaskFilter,
    sort: SortOption,
    in_flight: usize,
    last_error: Option<Error>,
    refresh_seq: u64,
}

impl TaskListState {
    pub fn new(sort: SortOption) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    pub fn all_tasks(&self) -> &[Task] {
        &self.all_tasks
    }

    pub fn display_tasks(&self) -> &[Task] {
        &self.display_tasks
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn sort(&self) -> SortOption {
        self.sort
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Mark a request as started; clears the previous error
    pub fn begin_request(&mut self) {
        self.in_flight += 1;
        self.last_error = None;
    }

    pub fn end_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Sequence number for a new refresh
    pub fn next_refresh(&mut self) -> u64 {
        self.refresh_seq += 1;
        self.refresh_seq
    }

    /// Only the most recently issued refresh may replace the list
    pub fn is_current_refresh(&self, seq: u64) -> bool {
        seq == self.refresh_seq
    }

    pub fn record_error(&mut self, error: Error) {
        self.last_error = Some(error);
    }

    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.all_tasks = tasks;
        self.apply_sort();
    }

    pub fn append(&mut self, task: Task) {
        self.all_tasks.push(task);
        self.apply_sort();
    }

    /// Replace the entry with the same id. Returns false, leaving the list
    /// untouched, when no entry matches.
    pub fn replace(&mut self, task: Task) -> bool {
        let position = task
            .id
            .as_ref()
            .and_then(|id| self.all_tasks.iter().position(|t| t.id.as_ref() == Some(id)));

        match position {
            Some(index) => {
                self.all_tasks[index] = task;
                self.apply_sort();
                true
            }
            None => false,
        }
    }

    /// Remove every entry with this id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.all_tasks.len();
        self.all_tasks.retain(|t| t.id.as_deref() != Some(id));
        self.apply_sort();
        self.all_tasks.len() != before
    }

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        self.sort = sort;
        self.apply_sort();
    }

    /// Recompute `display_tasks` from `all_tasks`
    pub fn apply_sort(&mut self) {
        let mut display = self.all_tasks.clone();
        sort_tasks(&mut display, self.sort);
        self.display_tasks = display;
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tasks: self.display_tasks.clone(),
            filter: self.filter.clone(),
            sort: self.sort,
            is_loading: self.is_loading(),
            last_error: self.last_error.clone(),
        }
    }
}
