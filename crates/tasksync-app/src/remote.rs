//! Remote store abstraction used by every synchronizing component.

use tasksync_core::{Credential, CsrfToken, RemoteError, Task, TaskId, TaskTitle};
use tasksync_store_http::HttpStore;

/// Calls the client issues against the task service.
///
/// Implementations attach the current anti-forgery token and the ambient
/// session credentials themselves; callers only see the payload or the
/// [`RemoteError`] describing the rejection.
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// Fetch a fresh anti-forgery token.
    ///
    /// # Errors
    /// Returns the rejection reported by the store.
    async fn fetch_csrf_token(&self) -> Result<CsrfToken, RemoteError>;

    /// Register a new account.
    ///
    /// # Errors
    /// Returns the rejection reported by the store.
    async fn sign_up(&self, credential: &Credential) -> Result<(), RemoteError>;

    /// Open a session.
    ///
    /// # Errors
    /// Returns the rejection reported by the store.
    async fn log_in(&self, credential: &Credential) -> Result<(), RemoteError>;

    /// Close the current session.
    ///
    /// # Errors
    /// Returns the rejection reported by the store.
    async fn log_out(&self) -> Result<(), RemoteError>;

    /// Load every task owned by the session user.
    ///
    /// # Errors
    /// Returns the rejection reported by the store.
    async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError>;

    /// Create a task and return it as stored.
    ///
    /// # Errors
    /// Returns the rejection reported by the store.
    async fn create_task(&self, body: &TaskTitle) -> Result<Task, RemoteError>;

    /// Retitle a task and return it as stored.
    ///
    /// # Errors
    /// Returns the rejection reported by the store.
    async fn update_task(&self, id: TaskId, body: &TaskTitle) -> Result<Task, RemoteError>;

    /// Delete a task.
    ///
    /// # Errors
    /// Returns the rejection reported by the store.
    async fn delete_task(&self, id: TaskId) -> Result<(), RemoteError>;
}

impl RemoteStore for HttpStore {
    async fn fetch_csrf_token(&self) -> Result<CsrfToken, RemoteError> {
        Self::fetch_csrf_token(self).await
    }

    async fn sign_up(&self, credential: &Credential) -> Result<(), RemoteError> {
        Self::sign_up(self, credential).await
    }

    async fn log_in(&self, credential: &Credential) -> Result<(), RemoteError> {
        Self::log_in(self, credential).await
    }

    async fn log_out(&self) -> Result<(), RemoteError> {
        Self::log_out(self).await
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        Self::list_tasks(self).await
    }

    async fn create_task(&self, body: &TaskTitle) -> Result<Task, RemoteError> {
        Self::create_task(self, body).await
    }

    async fn update_task(&self, id: TaskId, body: &TaskTitle) -> Result<Task, RemoteError> {
        Self::update_task(self, id, body).await
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), RemoteError> {
        Self::delete_task(self, id).await
    }
}
