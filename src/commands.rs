use anyhow::{bail, Context};
use chrono::Local;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::client::BackendClient;
use crate::models::{DueTime, NewTask, TaskId};
use crate::scheduler::{reminder_state, ReminderState};

/// Creates a task on the backend.
///
/// Empty descriptions and malformed times are rejected before any request.
pub async fn cmd_add(client: &BackendClient, description: String, at: Option<String>, silent: bool) -> anyhow::Result<()> {
    let description = description.trim().to_string();
    if description.is_empty() {
        bail!("task description must not be empty");
    }
    let due_time = at.as_deref().map(DueTime::parse).transpose()?;
    let task = client
        .create(&NewTask::new(description, due_time))
        .await
        .context("failed to create task")?;
    if !silent {
        match task.due_time {
            Some(due) => println!("Task added (id = {}), reminder at {}", task.id, due),
            None => println!("Task added (id = {})", task.id),
        }
    }
    Ok(())
}

/// Flips the completion flag of a task.
pub async fn cmd_toggle(client: &BackendClient, id: TaskId, silent: bool) -> anyhow::Result<()> {
    let tasks = client.fetch_all().await.context("failed to load tasks")?;
    let Some(task) = tasks.iter().find(|t| t.id == id) else {
        bail!("Task {} not found.", id);
    };
    let complete = !task.complete;
    client
        .set_complete(&id, complete)
        .await
        .context("failed to update task")?;
    if !silent {
        let state = if complete { "complete" } else { "open" };
        println!("Task {} marked as {}.", id, state);
    }
    Ok(())
}

/// Removes a task from the backend by ID.
pub async fn cmd_remove(client: &BackendClient, id: TaskId, silent: bool) -> anyhow::Result<()> {
    client.delete(&id).await.with_context(|| format!("failed to remove task {id}"))?;
    if !silent {
        println!("Task {} removed.", id);
    }
    Ok(())
}

/// Lists tasks in a formatted table, in backend order.
///
/// By default, hides completed tasks unless `all` is true.
pub async fn cmd_list(client: &BackendClient, all: bool) -> anyhow::Result<()> {
    let mut tasks = client.fetch_all().await.context("failed to load tasks")?;
    if !all {
        tasks.retain(|t| !t.complete);
    }
    if tasks.is_empty() {
        println!("No tasks found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Reminder").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
        ]);

    let now = Local::now().naive_local();

    for t in tasks {
        let (status, color) = match reminder_state(&t, now) {
            ReminderState::Inert => ("Done", Color::Green),
            ReminderState::Due => ("Due", Color::Red),
            ReminderState::Pending => ("Pending", Color::Yellow),
            ReminderState::NotArmed => ("Open", Color::Reset),
        };
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(&t.description),
            Cell::new(t.due_time.map(|d| d.to_string()).unwrap_or_else(|| "-".into())),
            Cell::new(status).fg(color),
        ]);
    }

    println!("{table}");
    Ok(())
}
