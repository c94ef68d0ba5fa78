use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{debug, trace};

use crate::models::{DueTime, Task, TaskId};

/// Period of the reminder tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Where a task stands with respect to its reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    /// No due time set.
    NotArmed,
    /// Due time later today.
    Pending,
    /// Due time reached and the task is still open.
    Due,
    /// Completed; never fires.
    Inert,
}

/// Classifies `task` at local wall-clock time `now`.
///
/// The due time is always placed on `now`'s calendar date.
pub fn reminder_state(task: &Task, now: NaiveDateTime) -> ReminderState {
    if task.complete {
        return ReminderState::Inert;
    }
    match task.due_time {
        None => ReminderState::NotArmed,
        Some(due) if now >= due.on(now.date()) => ReminderState::Due,
        Some(_) => ReminderState::Pending,
    }
}

/// Decides, once per tick, which tasks have just become due.
///
/// A task is reported once per session: the first time it is seen DUE it
/// gets a marker, and stays silent until it is removed or its due time changes.
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    notified: HashMap<TaskId, DueTime>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tasks that need a notification in this tick.
    pub fn evaluate(&mut self, tasks: &[Task], now: NaiveDateTime) -> Vec<Task> {
        self.prune(tasks);

        let mut newly_due = Vec::new();
        for task in tasks {
            if reminder_state(task, now) != ReminderState::Due {
                continue;
            }
            if self.notified.contains_key(&task.id) {
                trace!(id = %task.id, "already notified");
                continue;
            }
            if let Some(due) = task.due_time {
                debug!(id = %task.id, due = %due, "task became due");
                self.notified.insert(task.id.clone(), due);
                newly_due.push(task.clone());
            }
        }
        newly_due
    }

    /// Whether a reminder was already sent for `id` in this session.
    pub fn was_notified(&self, id: &TaskId) -> bool {
        self.notified.contains_key(id)
    }

    /// Drops the marker for a deleted task.
    pub fn forget(&mut self, id: &TaskId) {
        self.notified.remove(id);
    }

    fn prune(&mut self, tasks: &[Task]) {
        self.notified.retain(|id, due| {
            tasks
                .iter()
                .any(|t| &t.id == id && t.due_time.as_ref() == Some(due))
        });
    }
}
