//! Keeps the backend's copy of the task list eventually consistent with the
//! local store.
//!
//! Every network call is fire-and-forget: it runs on its own tokio task and
//! reports a [`SyncOutcome`] over a channel the event loop drains. Nothing is
//! retried, timed out or cancelled.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::BackendClient;
use crate::error::SyncError;
use crate::models::{NewTask, Task, TaskId};

/// Which kind of call an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Toggle,
    Delete,
    Snapshot,
}

/// Result of a finished network call, applied by the event loop.
#[derive(Debug)]
pub enum SyncOutcome {
    Loaded(Vec<Task>),
    Created(Task),
    Confirmed(Operation),
    Failed { op: Operation, error: SyncError },
}

/// Coarse view of how far the backend can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Initial load still outstanding.
    Loading,
    /// Last known state matches.
    Synced,
    /// Initial load failed; local list is all we have.
    Unsynced,
    /// A point mutation failed; a snapshot push is pending.
    Diverged,
}

#[derive(Debug)]
pub struct SyncEngine {
    client: BackendClient,
    tx: mpsc::UnboundedSender<SyncOutcome>,
    mirror_snapshots: bool,
    loaded: Option<bool>,
    diverged: bool,
    in_flight: usize,
}

impl SyncEngine {
    /// Creates the engine and the receiving end of its outcome channel.
    ///
    /// With `mirror_snapshots` every store change is followed by a full
    /// snapshot push; otherwise snapshots are only pushed to reconcile
    /// after a failed point mutation.
    pub fn new(
        client: BackendClient,
        mirror_snapshots: bool,
    ) -> (Self, mpsc::UnboundedReceiver<SyncOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = SyncEngine {
            client,
            tx,
            mirror_snapshots,
            loaded: None,
            diverged: false,
            in_flight: 0,
        };
        (engine, rx)
    }

    pub fn status(&self) -> SyncStatus {
        match self.loaded {
            None => SyncStatus::Loading,
            Some(_) if self.diverged => SyncStatus::Diverged,
            Some(true) => SyncStatus::Synced,
            Some(false) => SyncStatus::Unsynced,
        }
    }

    /// Number of calls whose outcome has not been recorded yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn begin_load(&mut self) {
        let client = self.client.clone();
        self.spawn(Operation::Load, async move {
            client.fetch_all().await.map(SyncOutcome::Loaded)
        });
    }

    pub fn create(&mut self, task: NewTask) {
        let client = self.client.clone();
        self.spawn(Operation::Create, async move {
            client.create(&task).await.map(SyncOutcome::Created)
        });
    }

    pub fn set_complete(&mut self, id: TaskId, complete: bool) {
        let client = self.client.clone();
        self.spawn(Operation::Toggle, async move {
            client
                .set_complete(&id, complete)
                .await
                .map(|_| SyncOutcome::Confirmed(Operation::Toggle))
        });
    }

    pub fn delete(&mut self, id: TaskId) {
        let client = self.client.clone();
        self.spawn(Operation::Delete, async move {
            client
                .delete(&id)
                .await
                .map(|_| SyncOutcome::Confirmed(Operation::Delete))
        });
    }

    /// Overwrites the backend with `snapshot`.
    pub fn push_snapshot(&mut self, snapshot: Arc<[Task]>) {
        let client = self.client.clone();
        self.spawn(Operation::Snapshot, async move {
            client
                .replace_all(&snapshot)
                .await
                .map(|_| SyncOutcome::Confirmed(Operation::Snapshot))
        });
    }

    /// Called after every change of the local collection.
    ///
    /// Automatic reconciliation is skipped while the initial load has failed:
    /// the local list is then empty or partial and would clobber the backend.
    pub fn after_mutation(&mut self, snapshot: Arc<[Task]>) {
        if self.mirror_snapshots {
            self.push_snapshot(snapshot);
        } else if self.diverged && self.loaded == Some(true) {
            info!(count = snapshot.len(), "reconciling backend with local snapshot");
            self.push_snapshot(snapshot);
        }
    }

    /// Updates bookkeeping for a finished call. Must see every outcome exactly once.
    pub fn record(&mut self, outcome: &SyncOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            SyncOutcome::Loaded(tasks) => {
                info!(count = tasks.len(), "loaded tasks from backend");
                self.loaded = Some(true);
            }
            SyncOutcome::Created(task) => debug!(id = %task.id, "task created"),
            SyncOutcome::Confirmed(Operation::Snapshot) => {
                debug!("snapshot accepted");
                self.diverged = false;
                if self.loaded == Some(false) {
                    self.loaded = Some(true);
                }
            }
            SyncOutcome::Confirmed(op) => debug!(?op, "backend confirmed"),
            SyncOutcome::Failed {
                op: Operation::Load,
                error,
            } => {
                warn!(%error, "initial load failed, continuing unsynced");
                self.loaded = Some(false);
            }
            SyncOutcome::Failed { op, error } => {
                warn!(?op, %error, "sync call failed, local state stays authoritative");
                self.diverged = true;
            }
        }
    }

    fn spawn<F>(&mut self, op: Operation, call: F)
    where
        F: Future<Output = Result<SyncOutcome, SyncError>> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = match call.await {
                Ok(outcome) => outcome,
                Err(error) => SyncOutcome::Failed { op, error },
            };
            // A closed channel means the session is gone; nobody cares anymore.
            let _ = tx.send(outcome);
        });
    }
}
