//! Client-side ordering of a fetched task list

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::model::Task;

/// Display order for the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    /// Ascending by the `dueDate` string
    #[default]
    DueDate,
    /// High, medium, low, then anything else
    Priority,
    /// Ascending, case-sensitive
    Title,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DueDate => "dueDate",
            Self::Priority => "priority",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown sort option: {0} (expected dueDate, priority or title)")]
pub struct UnknownSortOption(pub String);

impl FromStr for SortOption {
    type Err = UnknownSortOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dueDate" | "due-date" | "due_date" | "due" => Ok(Self::DueDate),
            "priority" => Ok(Self::Priority),
            "title" => Ok(Self::Title),
            other => Err(UnknownSortOption(other.to_string())),
        }
    }
}

/// Sort in place. The sort is stable, so equal keys keep their fetched order.
pub fn sort_tasks(tasks: &mut [Task], option: SortOption) {
    match option {
        SortOption::DueDate => tasks.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
        SortOption::Priority => tasks.sort_by_key(|t| t.priority.rank()),
        SortOption::Title => tasks.sort_by(|a, b| a.title.cmp(&b.title)),
    }
}

/// Sorted copy of `tasks`
pub fn sorted(tasks: &[Task], option: SortOption) -> Vec<Task> {
    let mut result = tasks.to_vec();
    sort_tasks(&mut result, option);
    result
}
