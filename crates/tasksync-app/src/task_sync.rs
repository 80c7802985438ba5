//! Create/update/delete against the remote store, reconciled into the cache.

use std::sync::Arc;

use tasksync_core::{ComposerMode, EditedTask, Task, TaskId, TaskTitle};
use tracing::{debug, info};

use crate::classifier::ErrorDispatcher;
use crate::edit_state::EditState;
use crate::error::{InvalidInput, SyncError};
use crate::presenter::Presenter;
use crate::remote::RemoteStore;
use crate::task_cache::TaskCache;

/// Owner of the local task collection's write path.
///
/// The cache is written only from successful response payloads. Overlapping
/// calls are not serialized: each response is reconciled as it arrives.
pub struct TaskSynchronizer<R, P> {
    remote: Arc<R>,
    errors: Arc<ErrorDispatcher<R, P>>,
    edit: EditState,
    cache: TaskCache,
}

impl<R, P> TaskSynchronizer<R, P> {
    /// Wire a synchronizer to the shared client state.
    pub const fn new(
        remote: Arc<R>,
        errors: Arc<ErrorDispatcher<R, P>>,
        edit: EditState,
        cache: TaskCache,
    ) -> Self {
        Self {
            remote,
            errors,
            edit,
            cache,
        }
    }
}

impl<R: RemoteStore, P: Presenter> TaskSynchronizer<R, P> {
    /// Submit the composer: create in sentinel mode, update otherwise.
    ///
    /// # Errors
    /// [`InvalidInput::EmptyTitle`] for an empty composer, otherwise as for
    /// [`create`](Self::create) / [`update`](Self::update).
    pub async fn submit(&self) -> Result<Task, SyncError> {
        let edited = self.edit.get();
        if !edited.can_submit() {
            return Err(InvalidInput::EmptyTitle.into());
        }
        match edited.mode() {
            ComposerMode::Create => self.create(&edited.title).await,
            ComposerMode::Update => self.update(&edited).await,
        }
    }

    /// Create a task and append the stored copy to the cache.
    ///
    /// # Errors
    /// [`InvalidInput`] when the composer is editing an existing task or the
    /// title is empty; [`SyncError::Rejected`] when the store refuses.
    pub async fn create(&self, title: &str) -> Result<Task, SyncError> {
        let current = self.edit.get().id;
        if !current.is_sentinel() {
            return Err(InvalidInput::NotInCreateMode(current).into());
        }
        if title.is_empty() {
            return Err(InvalidInput::EmptyTitle.into());
        }

        let created = match self.remote.create_task(&TaskTitle::new(title)).await {
            Ok(task) => task,
            Err(err) => return Err(self.errors.dispatch(&err).await.into()),
        };
        info!(id = %created.id, "task created");
        self.cache.append(created.clone());
        self.edit.reset();
        Ok(created)
    }

    /// Retitle a task and replace its cache entry with the stored copy.
    ///
    /// # Errors
    /// [`InvalidInput::SentinelUpdate`] for the sentinel id;
    /// [`SyncError::Rejected`] when the store refuses.
    pub async fn update(&self, task: &EditedTask) -> Result<Task, SyncError> {
        if task.is_sentinel() {
            return Err(InvalidInput::SentinelUpdate.into());
        }

        let updated = match self
            .remote
            .update_task(task.id, &TaskTitle::new(task.title.as_str()))
            .await
        {
            Ok(stored) => stored,
            Err(err) => return Err(self.errors.dispatch(&err).await.into()),
        };
        info!(id = %updated.id, "task updated");
        if !self.cache.replace(updated.clone()) {
            debug!(id = %updated.id, "updated task not present in cache");
        }
        self.edit.reset();
        Ok(updated)
    }

    /// Delete a task and drop it from the cache.
    ///
    /// # Errors
    /// [`SyncError::Rejected`] when the store refuses.
    pub async fn delete(&self, id: TaskId) -> Result<(), SyncError> {
        if let Err(err) = self.remote.delete_task(id).await {
            return Err(self.errors.dispatch(&err).await.into());
        }
        info!(%id, "task deleted");
        self.cache.remove(id);
        self.edit.reset();
        Ok(())
    }
}
