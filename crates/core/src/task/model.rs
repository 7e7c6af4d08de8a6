//! Task model definitions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Error, Result};

/// Task priority level
///
/// Values the server sends outside the known set are kept verbatim in
/// `Other` and sent back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Other(value) => value,
        }
    }

    /// Position in priority ordering: high first, unknown values last
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
            Self::Other(_) => 3,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task completion status
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Pending,
    Completed,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "completed" => Self::Completed,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task record as exchanged with the server
///
/// `id` is `None` until the server has persisted the task. On the wire the
/// identifier travels as `_id`; a plain `id` is also accepted when decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(
        rename = "_id",
        alias = "id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    pub priority: Priority,
    pub status: Status,
}

impl Task {
    /// Create a new unsaved task with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            due_date: String::new(),
            priority: Priority::default(),
            status: Status::default(),
        }
    }

    /// Set the id, as the server does on creation
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the due date
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = due_date.into();
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = priority.into();
        self
    }

    /// Set the status
    pub fn with_status(mut self, status: impl Into<Status>) -> Self {
        self.status = status.into();
        self
    }

    /// Whether the server has assigned an id yet
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// The server id, or `InvalidData` for a task that was never saved
    pub fn require_id(&self) -> Result<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::InvalidData("Task ID is missing".to_string()))
    }

    /// The request body for create and update calls
    pub fn payload(&self) -> TaskPayload<'_> {
        TaskPayload {
            title: &self.title,
            description: &self.description,
            due_date: &self.due_date,
            priority: self.priority.as_str(),
            status: self.status.as_str(),
        }
    }
}

/// Outgoing body for `POST /tasks` and `PUT /tasks/{id}`; never carries the id
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub due_date: &'a str,
    pub priority: &'a str,
    pub status: &'a str,
}

/// Server-side list narrowing, sent as query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl TaskFilter {
    pub fn new(priority: Option<Priority>, status: Option<Status>) -> Self {
        Self { priority, status }
    }

    pub fn is_empty(&self) -> bool {
        self.priority.is_none() && self.status.is_none()
    }

    /// Whether a task passes every present filter
    pub fn matches(&self, task: &Task) -> bool {
        self.priority.as_ref().map_or(true, |p| *p == task.priority)
            && self.status.as_ref().map_or(true, |s| *s == task.status)
    }
}
