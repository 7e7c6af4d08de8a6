//! Draft holder for the create/edit flow
//!
//! An editor wraps one task while the user changes it and saves it through
//! the [`StoreHandle`], so the displayed list reconciles exactly once.

use chrono::{Local, NaiveDate};

use crate::store::{StoreError, StoreHandle};
use crate::task::{Priority, Status, Task};
use crate::Error;

/// Due dates are written in this format so string order is date order
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct TaskEditor {
    task: Task,
    is_saved: bool,
    last_error: Option<StoreError>,
}

impl TaskEditor {
    /// Blank draft: medium priority, pending, due `today`
    pub fn new_task(today: NaiveDate) -> Self {
        let task = Task::new("")
            .with_priority(Priority::Medium)
            .with_status(Status::Pending)
            .with_due_date(today.format(DUE_DATE_FORMAT).to_string());
        Self::from_task(task)
    }

    /// Blank draft due today in local time
    pub fn new_task_today() -> Self {
        Self::new_task(Local::now().date_naive())
    }

    /// Edit an existing task. A missing due date becomes `today`.
    pub fn edit(mut task: Task, today: NaiveDate) -> Self {
        if task.due_date.is_empty() {
            task.due_date = today.format(DUE_DATE_FORMAT).to_string();
        }
        Self::from_task(task)
    }

    fn from_task(task: Task) -> Self {
        Self {
            task,
            is_saved: false,
            last_error: None,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn task_mut(&mut self) -> &mut Task {
        &mut self.task
    }

    pub fn into_task(self) -> Task {
        self.task
    }

    pub fn set_due_date(&mut self, date: NaiveDate) {
        self.task.due_date = date.format(DUE_DATE_FORMAT).to_string();
    }

    /// The due date, when it is in the editor's own format
    pub fn due_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.task.due_date, DUE_DATE_FORMAT).ok()
    }

    /// True until the server has assigned an id
    pub fn is_new(&self) -> bool {
        !self.task.is_persisted()
    }

    pub fn is_valid(&self) -> bool {
        !self.task.title.trim().is_empty() && !self.task.due_date.is_empty()
    }

    pub fn is_saved(&self) -> bool {
        self.is_saved
    }

    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    /// Create or update the task depending on whether it has an id
    ///
    /// Invalid drafts are rejected with `InvalidData` before any request is
    /// made. On success the editor holds the server's copy.
    pub async fn save(&mut self, store: &StoreHandle) -> Result<Task, StoreError> {
        self.last_error = None;

        let result = if !self.is_valid() {
            Err(StoreError::Service(Error::InvalidData(
                "Title and due date are required".to_string(),
            )))
        } else if self.is_new() {
            store.create(self.task.clone()).await
        } else {
            store.update(self.task.clone()).await
        };

        match result {
            Ok(saved) => {
                self.task = saved.clone();
                self.is_saved = true;
                Ok(saved)
            }
            Err(e) => {
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }
}
