//! Errors returned by the synchronizing components.

use tasksync_core::TaskId;
use thiserror::Error;

use crate::classifier::{Action, ErrorKind};

/// Input rejected locally, before any remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    /// A task title is required.
    #[error("Task title must not be empty")]
    EmptyTitle,

    /// `create` was requested while the composer holds an existing task.
    #[error("Composer is editing task {0}; cannot create")]
    NotInCreateMode(TaskId),

    /// `update` was requested for the sentinel id.
    #[error("Cannot update a task that has not been created")]
    SentinelUpdate,

    /// Email and password are both required.
    #[error("Email and password are required")]
    IncompleteCredential,

    /// Another login/register/logout is still pending.
    #[error("Another session transition is in progress")]
    TransitionPending,
}

/// Failure of a client operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The remote store rejected the call. The action has already been
    /// dispatched to the user; callers must not alert again.
    #[error("Request rejected: {}", .0.alert)]
    Rejected(Action),

    /// The call was never issued.
    #[error(transparent)]
    Invalid(#[from] InvalidInput),
}

impl SyncError {
    /// Classified kind of a remote rejection.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Rejected(action) => Some(action.kind),
            Self::Invalid(_) => None,
        }
    }
}

impl From<Action> for SyncError {
    fn from(action: Action) -> Self {
        Self::Rejected(action)
    }
}
