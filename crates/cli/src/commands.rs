use anyhow::Context;
use std::sync::Arc;
use tracing::debug;

use taskapp_client::{ClientConfig, HttpTaskClient};
use taskapp_core::editor::TaskEditor;
use taskapp_core::store::{StoreHandle, TaskStore};
use taskapp_core::task::{Priority, SortOption, Status, Task, TaskFilter};

use crate::cli::{Cli, Command, TaskFields};
use crate::output;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let api_key = cli
        .api_key
        .filter(|key| !key.is_empty())
        .context("An API key is required: pass --api-key or set TASKAPP_API_KEY")?;
    let config = ClientConfig::new(&cli.api_url, api_key)?;
    debug!(?config, "Connecting to task service");

    let client = HttpTaskClient::new(config)?;
    let store = TaskStore::spawn(Arc::new(client));

    match cli.command {
        Command::List {
            priority,
            status,
            sort,
        } => list(&store, filter(priority, status), sort, cli.json).await,
        Command::Add { title, fields } => {
            let mut editor = TaskEditor::new_task_today();
            editor.task_mut().title = title;
            apply_fields(&mut editor, fields);
            let saved = editor.save(&store).await?;
            output::print_task(&saved, cli.json)
        }
        Command::Edit { id, title, fields } => {
            let mut editor = TaskEditor::edit(find_task(&store, &id).await?, today());
            if let Some(title) = title {
                editor.task_mut().title = title;
            }
            apply_fields(&mut editor, fields);
            let saved = editor.save(&store).await?;
            output::print_task(&saved, cli.json)
        }
        Command::Complete { id } => {
            let mut editor = TaskEditor::edit(find_task(&store, &id).await?, today());
            editor.task_mut().status = Status::Completed;
            let saved = editor.save(&store).await?;
            output::print_task(&saved, cli.json)
        }
        Command::Delete { id } => {
            store.delete(id.as_str()).await?;
            if !cli.json {
                println!("Deleted task {}", id);
            }
            Ok(())
        }
    }
}

async fn list(
    store: &StoreHandle,
    filter: TaskFilter,
    sort: SortOption,
    json: bool,
) -> anyhow::Result<()> {
    store.set_sort(sort).await?;
    store.set_filters(filter).await?;
    output::print_tasks(&store.snapshot().tasks, json)
}

fn filter(priority: Option<String>, status: Option<String>) -> TaskFilter {
    TaskFilter::new(priority.map(Priority::from), status.map(Status::from))
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// The list endpoint is the only way to read tasks, so look the id up there
async fn find_task(store: &StoreHandle, id: &str) -> anyhow::Result<Task> {
    store.refresh().await?;
    store
        .snapshot()
        .tasks
        .into_iter()
        .find(|task| task.id.as_deref() == Some(id))
        .with_context(|| format!("Task {} not found", id))
}

fn apply_fields(editor: &mut TaskEditor, fields: TaskFields) {
    if let Some(description) = fields.description {
        editor.task_mut().description = description;
    }
    if let Some(due) = fields.due {
        editor.set_due_date(due);
    }
    if let Some(priority) = fields.priority {
        editor.task_mut().priority = Priority::from(priority);
    }
    if let Some(status) = fields.status {
        editor.task_mut().status = Status::from(status);
    }
}
