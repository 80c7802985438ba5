//! Read side of the task collection.

use std::sync::Arc;

use tasksync_core::Task;
use tracing::{debug, info};

use crate::classifier::ErrorDispatcher;
use crate::error::SyncError;
use crate::presenter::Presenter;
use crate::remote::RemoteStore;
use crate::session::SessionState;
use crate::task_cache::TaskCache;

/// Serves the task list, hitting the store only while nothing is cached.
pub struct TaskQuery<R, P> {
    remote: Arc<R>,
    errors: Arc<ErrorDispatcher<R, P>>,
    cache: TaskCache,
    session: SessionState,
}

impl<R, P> TaskQuery<R, P> {
    /// Wire a query to the shared cache and session.
    pub const fn new(
        remote: Arc<R>,
        errors: Arc<ErrorDispatcher<R, P>>,
        cache: TaskCache,
        session: SessionState,
    ) -> Self {
        Self {
            remote,
            errors,
            cache,
            session,
        }
    }

    /// Whether a list has been loaded since the last session reset.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    /// Current cached list without touching the store.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<Task>> {
        self.cache.snapshot()
    }
}

impl<R: RemoteStore, P: Presenter> TaskQuery<R, P> {
    /// Return the cached list, fetching it first if nothing is loaded.
    ///
    /// # Errors
    /// [`SyncError::Rejected`] when the fetch is refused; the cache stays
    /// unloaded so the next call retries.
    ///
    /// A list that arrives after the session changed is returned but not
    /// cached.
    pub async fn load_all(&self) -> Result<Vec<Task>, SyncError> {
        if let Some(tasks) = self.cache.snapshot() {
            debug!(count = tasks.len(), "serving cached tasks");
            return Ok(tasks);
        }

        let generation = self.session.generation();
        let tasks = match self.remote.list_tasks().await {
            Ok(tasks) => tasks,
            Err(err) => return Err(self.errors.dispatch(&err).await.into()),
        };
        if self.session.generation() != generation {
            debug!(count = tasks.len(), "session changed during load; not caching");
            return Ok(tasks);
        }
        info!(count = tasks.len(), "task list loaded");
        self.cache.seed(tasks.clone());
        Ok(tasks)
    }
}
