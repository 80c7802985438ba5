//! Shared composer state.

use std::sync::{Arc, PoisonError, RwLock};

use tasksync_core::{EditedTask, Task};

/// Holder of the single [`EditedTask`] live in the client.
///
/// Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct EditState {
    edited: Arc<RwLock<EditedTask>>,
}

impl EditState {
    /// Create a composer in create mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current composer contents.
    #[must_use]
    pub fn get(&self) -> EditedTask {
        self.edited
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the composer contents.
    pub fn set(&self, edited: EditedTask) {
        *self.edited.write().unwrap_or_else(PoisonError::into_inner) = edited;
    }

    /// Change the title while keeping the id (and therefore the mode).
    pub fn set_title(&self, title: impl Into<String>) {
        self.edited
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .title = title.into();
    }

    /// Load an existing task into the composer.
    pub fn begin_edit(&self, task: &Task) {
        self.set(EditedTask::from(task));
    }

    /// Return to create mode with an empty title.
    pub fn reset(&self) {
        self.set(EditedTask::sentinel());
    }
}
