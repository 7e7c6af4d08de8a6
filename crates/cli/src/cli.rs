use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use taskapp_client::DEFAULT_API_URL;
use taskapp_core::task::SortOption;

#[derive(Parser, Debug)]
#[command(name = "taskapp", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Tasks endpoint of the server
    #[arg(long, env = "TASKAPP_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Shared API key sent as x-api-key
    #[arg(long, env = "TASKAPP_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks
    ///
    /// Example: taskapp list --priority high --sort title
    List {
        #[arg(long, value_parser = ["low", "medium", "high"])]
        priority: Option<String>,
        #[arg(long, value_parser = ["pending", "completed"])]
        status: Option<String>,
        /// dueDate, priority or title
        #[arg(long, default_value = "dueDate")]
        sort: SortOption,
    },
    /// Add a new task
    ///
    /// Example: taskapp add --title "Buy milk" --due 2025-03-10 --priority high
    Add {
        #[arg(long)]
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Edit fields of an existing task
    ///
    /// Example: taskapp edit 65f0c0ffee --status completed
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Mark a task as completed
    Complete { id: String },
    /// Delete a task
    Delete { id: String },
}

/// Optional task fields shared by `add` and `edit`
#[derive(Args, Debug, Default)]
pub struct TaskFields {
    #[arg(long)]
    pub description: Option<String>,
    /// Due date as YYYY-MM-DD
    #[arg(long)]
    pub due: Option<NaiveDate>,
    #[arg(long, value_parser = ["low", "medium", "high"])]
    pub priority: Option<String>,
    #[arg(long, value_parser = ["pending", "completed"])]
    pub status: Option<String>,
}
