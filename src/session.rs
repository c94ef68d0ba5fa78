//! The running session: one task store, the sync engine mirroring it, the
//! reminder scheduler reading it and the dispatcher alerting on it.
//!
//! Front ends own a `Session` and drive it from a single event loop:
//! call [`Session::tick`] once per [`TICK_INTERVAL`](crate::scheduler::TICK_INTERVAL),
//! feed every [`SyncOutcome`] back through [`Session::apply`], and forward
//! user actions to the mutation methods.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::BackendClient;
use crate::config::AlertSettings;
use crate::error::SessionError;
use crate::models::{DueTime, NewTask, Task, TaskId};
use crate::notify::{AlertSurface, Dispatcher, OverlaySurface};
use crate::scheduler::{reminder_state, ReminderScheduler, ReminderState};
use crate::store::TaskStore;
use crate::sync::{SyncEngine, SyncOutcome, SyncStatus};

pub struct Session<S> {
    store: TaskStore,
    sync: SyncEngine,
    scheduler: ReminderScheduler,
    dispatcher: Dispatcher<S>,
    outcomes: mpsc::UnboundedReceiver<SyncOutcome>,
}

impl<S: AlertSurface> Session<S> {
    pub fn new(
        client: BackendClient,
        surface: S,
        alerts: &AlertSettings,
        mirror_snapshots: bool,
    ) -> Self {
        let (sync, outcomes) = SyncEngine::new(client, mirror_snapshots);
        Session {
            store: TaskStore::new(),
            sync,
            scheduler: ReminderScheduler::new(),
            dispatcher: Dispatcher::new(surface, alerts),
            outcomes,
        }
    }

    /// Asks for notification permission and starts the initial load.
    pub fn start(&mut self) {
        self.dispatcher.init();
        self.sync.begin_load();
    }

    /// Ends the session. Outstanding network calls are abandoned.
    pub fn shutdown(self) {
        info!(
            tasks = self.store.len(),
            in_flight = self.sync.in_flight(),
            reminders = self.dispatcher.dispatched(),
            "session closed"
        );
    }

    /// One scheduler pass at local time `now`. Returns how many reminders fired.
    pub fn tick(&mut self, now: NaiveDateTime) -> usize {
        let snapshot = self.store.snapshot();
        let due = self.scheduler.evaluate(&snapshot, now);
        for task in &due {
            info!(id = %task.id, description = %task.description, "reminder");
            self.dispatcher.dispatch(task);
        }
        due.len()
    }

    /// Waits for the next finished network call.
    pub async fn next_outcome(&mut self) -> Option<SyncOutcome> {
        self.outcomes.recv().await
    }

    /// Applies a finished network call to the local state.
    pub fn apply(&mut self, outcome: SyncOutcome) {
        self.sync.record(&outcome);
        match outcome {
            SyncOutcome::Loaded(tasks) => {
                self.store.merge_loaded(tasks);
                self.sync.after_mutation(self.store.snapshot());
            }
            SyncOutcome::Created(task) => {
                if self.store.append(task.clone()) {
                    self.sync.after_mutation(self.store.snapshot());
                } else {
                    warn!(id = %task.id, "backend returned an id already in use, ignoring");
                }
            }
            SyncOutcome::Confirmed(_) | SyncOutcome::Failed { .. } => {}
        }
    }

    /// Sends a new task to the backend; it joins the list once the backend answers.
    pub fn create(
        &mut self,
        description: &str,
        due_time: Option<DueTime>,
    ) -> Result<(), SessionError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(SessionError::EmptyDescription);
        }
        debug!(description, due = ?due_time, "creating task");
        self.sync.create(NewTask::new(description, due_time));
        Ok(())
    }

    /// Flips completion locally, then tells the backend. Returns the new value.
    pub fn toggle(&mut self, id: &TaskId) -> Result<bool, SessionError> {
        let complete = self
            .store
            .toggle(id)
            .ok_or_else(|| SessionError::UnknownTask(id.clone()))?;
        self.sync.set_complete(id.clone(), complete);
        self.sync.after_mutation(self.store.snapshot());
        Ok(complete)
    }

    /// Removes a task locally, then tells the backend.
    pub fn remove(&mut self, id: &TaskId) -> Result<Task, SessionError> {
        let removed = self
            .store
            .remove(id)
            .ok_or_else(|| SessionError::UnknownTask(id.clone()))?;
        self.scheduler.forget(id);
        self.sync.delete(id.clone());
        self.sync.after_mutation(self.store.snapshot());
        Ok(removed)
    }

    /// Overwrites the backend with the local list, on user request.
    pub fn push_snapshot(&mut self) {
        self.sync.push_snapshot(self.store.snapshot());
    }

    pub fn tasks(&self) -> Arc<[Task]> {
        self.store.snapshot()
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn state_of(&self, task: &Task, now: NaiveDateTime) -> ReminderState {
        reminder_state(task, now)
    }

    pub fn was_notified(&self, id: &TaskId) -> bool {
        self.scheduler.was_notified(id)
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.sync.status()
    }

    pub fn in_flight(&self) -> usize {
        self.sync.in_flight()
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<S> {
        &mut self.dispatcher
    }
}

impl Session<OverlaySurface> {
    /// Closes the oldest toast and asks for window focus.
    pub fn dismiss_toast(&mut self) -> bool {
        let dismissed = self.dispatcher.surface_mut().toasts.dismiss_front();
        if dismissed.is_some() {
            self.dispatcher.dismissed();
        }
        dismissed.is_some()
    }

    /// Keeps the oldest toast from auto-closing.
    pub fn hold_toast(&mut self) -> bool {
        self.dispatcher.surface_mut().toasts.hold_front()
    }
}
