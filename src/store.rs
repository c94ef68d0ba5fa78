use std::sync::Arc;

use crate::models::{Task, TaskId};

/// In-memory, insertion-ordered task collection for the running session.
///
/// Readers get an `Arc<[Task]>` snapshot; every mutation builds a new slice,
/// so a snapshot handed out earlier never changes under the reader.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: Arc<[Task]>,
    revision: u64,
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore {
            tasks: Arc::from(Vec::new()),
            revision: 0,
        }
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current collection. Cheap to clone, immutable.
    pub fn snapshot(&self) -> Arc<[Task]> {
        Arc::clone(&self.tasks)
    }

    /// Bumped on every mutation; a changed revision means a new collection reference.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Replaces the whole collection, e.g. with the result of a load.
    ///
    /// Later duplicates of an id are dropped.
    pub fn replace(&mut self, tasks: Vec<Task>) {
        let mut unique: Vec<Task> = Vec::with_capacity(tasks.len());
        for t in tasks {
            if !unique.iter().any(|u| u.id == t.id) {
                unique.push(t);
            }
        }
        self.commit(unique);
    }

    /// Replaces the collection with a load result, keeping local tasks the
    /// load does not contain (created while the load was in flight) at the end.
    pub fn merge_loaded(&mut self, loaded: Vec<Task>) {
        let mut merged: Vec<Task> = Vec::with_capacity(loaded.len() + self.tasks.len());
        for t in loaded.into_iter().chain(self.tasks.iter().cloned()) {
            if !merged.iter().any(|m| m.id == t.id) {
                merged.push(t);
            }
        }
        self.commit(merged);
    }

    /// Appends a task. Returns `false` (and leaves the store untouched) if the id is taken.
    pub fn append(&mut self, task: Task) -> bool {
        if self.get(&task.id).is_some() {
            return false;
        }
        let mut next = self.tasks.to_vec();
        next.push(task);
        self.commit(next);
        true
    }

    /// Flips `complete` and returns the new value, or `None` if no such task.
    pub fn toggle(&mut self, id: &TaskId) -> Option<bool> {
        let idx = self.tasks.iter().position(|t| &t.id == id)?;
        let mut next = self.tasks.to_vec();
        next[idx].complete = !next[idx].complete;
        let value = next[idx].complete;
        self.commit(next);
        Some(value)
    }

    /// Removes a task and returns it, or `None` if no such task.
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| &t.id == id)?;
        let mut next = self.tasks.to_vec();
        let removed = next.remove(idx);
        self.commit(next);
        Some(removed)
    }

    fn commit(&mut self, tasks: Vec<Task>) {
        self.tasks = Arc::from(tasks);
        self.revision += 1;
    }
}
