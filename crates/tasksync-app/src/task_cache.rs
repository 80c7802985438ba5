//! Local mirror of the remote task collection.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tasksync_core::{Task, TaskId};
use tracing::debug;

/// Loaded task list plus an id index.
#[derive(Debug, Default, Clone)]
struct LoadedTasks {
    /// Tasks in server order, new ones appended.
    tasks: Vec<Task>,
    /// Mapping from task id to index into `tasks`.
    task_index: HashMap<TaskId, usize>,
}

impl LoadedTasks {
    fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut loaded = Self {
            tasks,
            task_index: HashMap::new(),
        };
        loaded.rebuild_index();
        loaded
    }

    fn rebuild_index(&mut self) {
        self.task_index = self
            .tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| (task.id, idx))
            .collect();
    }
}

/// Shared cache of the session's tasks.
///
/// `None` means "not fetched in this session". Entries are only ever written
/// from server payloads. Reconciliation against an unloaded cache is a
/// no-op: the next full fetch carries the server's state anyway.
#[derive(Debug, Clone, Default)]
pub struct TaskCache {
    state: Arc<RwLock<Option<LoadedTasks>>>,
}

impl TaskCache {
    /// Create an unloaded cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<LoadedTasks>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<LoadedTasks>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a full fetch has seeded the cache.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.read().is_some()
    }

    /// Copy of the collection, or `None` when unloaded.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<Task>> {
        self.read().as_ref().map(|loaded| loaded.tasks.clone())
    }

    /// Copy of the collection, empty when unloaded.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.snapshot().unwrap_or_default()
    }

    /// Look up a cached task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<Task> {
        let state = self.read();
        let loaded = state.as_ref()?;
        loaded
            .task_index
            .get(&id)
            .and_then(|&idx| loaded.tasks.get(idx))
            .cloned()
    }

    /// Replace the whole collection with a fresh fetch.
    pub fn seed(&self, tasks: Vec<Task>) {
        debug!(count = tasks.len(), "seeding task cache");
        *self.write() = Some(LoadedTasks::from_tasks(tasks));
    }

    /// Append a newly created task. Returns false when unloaded.
    pub fn append(&self, task: Task) -> bool {
        let mut state = self.write();
        let Some(loaded) = state.as_mut() else {
            return false;
        };
        debug!(id = %task.id, "appending task to cache");
        loaded.task_index.insert(task.id, loaded.tasks.len());
        loaded.tasks.push(task);
        true
    }

    /// Replace the entry with the same id in place.
    ///
    /// Returns false when unloaded or when no entry has that id; a missing
    /// entry is not re-added.
    pub fn replace(&self, task: Task) -> bool {
        let mut state = self.write();
        let Some(loaded) = state.as_mut() else {
            return false;
        };
        let Some(&idx) = loaded.task_index.get(&task.id) else {
            debug!(id = %task.id, "no cached entry to replace");
            return false;
        };
        debug!(id = %task.id, "replacing cached task");
        loaded.tasks[idx] = task;
        true
    }

    /// Remove the entry with `id`. Returns false when nothing was removed.
    pub fn remove(&self, id: TaskId) -> bool {
        let mut state = self.write();
        let Some(loaded) = state.as_mut() else {
            return false;
        };
        let Some(idx) = loaded.task_index.get(&id).copied() else {
            return false;
        };
        debug!(%id, "removing task from cache");
        loaded.tasks.remove(idx);
        loaded.rebuild_index();
        true
    }

    /// Discard the collection, forcing a full fetch on next access.
    pub fn clear(&self) {
        debug!("clearing task cache");
        *self.write() = None;
    }
}
