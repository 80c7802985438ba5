//! Composition root wiring the components to one shared state.

use std::sync::Arc;

use tasksync_core::{CsrfHeader, RemoteError};

use crate::classifier::ErrorDispatcher;
use crate::csrf::CsrfTokenManager;
use crate::edit_state::EditState;
use crate::remote::RemoteStore;
use crate::session::{SessionController, SessionState};
use crate::task_cache::TaskCache;
use crate::task_query::TaskQuery;
use crate::task_sync::TaskSynchronizer;

/// One client session against a remote store.
///
/// Every component sees the same edit state, cache, session flag and CSRF
/// header slot.
pub struct Client<R, P> {
    tokens: CsrfTokenManager<R>,
    session: SessionController<R, P>,
    tasks: TaskSynchronizer<R, P>,
    query: TaskQuery<R, P>,
    edit: EditState,
    cache: TaskCache,
}

impl<R, P> Client<R, P> {
    /// Build a client around `remote`. `header` must be the slot the
    /// transport reads when sending requests.
    pub fn new(remote: Arc<R>, presenter: Arc<P>, header: CsrfHeader) -> Self {
        let edit = EditState::new();
        let cache = TaskCache::new();
        let session = SessionState::new();
        let errors = Arc::new(ErrorDispatcher::new(
            CsrfTokenManager::new(Arc::clone(&remote), header.clone()),
            Arc::clone(&presenter),
            edit.clone(),
        ));

        Self {
            tokens: CsrfTokenManager::new(Arc::clone(&remote), header),
            session: SessionController::new(
                Arc::clone(&remote),
                presenter,
                Arc::clone(&errors),
                edit.clone(),
                cache.clone(),
                session.clone(),
            ),
            tasks: TaskSynchronizer::new(
                Arc::clone(&remote),
                Arc::clone(&errors),
                edit.clone(),
                cache.clone(),
            ),
            query: TaskQuery::new(remote, errors, cache.clone(), session),
            edit,
            cache,
        }
    }

    /// Login, registration and logout.
    #[must_use]
    pub const fn session(&self) -> &SessionController<R, P> {
        &self.session
    }

    /// Task mutations.
    #[must_use]
    pub const fn tasks(&self) -> &TaskSynchronizer<R, P> {
        &self.tasks
    }

    /// Task reads.
    #[must_use]
    pub const fn query(&self) -> &TaskQuery<R, P> {
        &self.query
    }

    /// Composer state.
    #[must_use]
    pub const fn edit(&self) -> &EditState {
        &self.edit
    }

    /// Shared task cache.
    #[must_use]
    pub const fn cache(&self) -> &TaskCache {
        &self.cache
    }

    /// Anti-forgery token manager.
    #[must_use]
    pub const fn tokens(&self) -> &CsrfTokenManager<R> {
        &self.tokens
    }
}

impl<R: RemoteStore, P> Client<R, P> {
    /// Fetch the first anti-forgery token.
    ///
    /// # Errors
    /// Returns the store's rejection. The client stays usable; the first
    /// CSRF rejection triggers another fetch.
    pub async fn prime(&self) -> Result<(), RemoteError> {
        self.tokens.prime().await
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use crate::classifier::messages;
    use crate::testing::{Call, Endpoint, MockRemote, harness, rejection};
    use tasksync_core::RemoteError;

    #[tokio::test]
    async fn prime_installs_header_shared_with_transport() {
        let h = harness(MockRemote::default());
        h.client.prime().await.expect("prime");
        assert_eq!(h.header.current().as_deref(), Some("token-1"));
        assert_eq!(h.client.tokens().header().current().as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn failed_prime_leaves_header_empty() {
        let h = harness(MockRemote::default());
        h.remote.fail_csrf(RemoteError::Transport("connection refused".into()));
        h.client.prime().await.expect_err("must fail");
        assert_eq!(h.header.current(), None);
    }

    #[tokio::test]
    async fn csrf_rejection_from_any_component_refreshes_shared_header() {
        let h = harness(MockRemote::default());
        h.client.prime().await.expect("prime");
        h.remote.fail(Endpoint::Create, rejection(messages::INVALID_CSRF_TOKEN));

        h.client.tasks().create("x").await.expect_err("must fail");

        assert_eq!(h.header.current().as_deref(), Some("token-2"));
        assert_eq!(
            h.remote.calls(),
            vec![Call::FetchCsrf, Call::Create("x".into()), Call::FetchCsrf]
        );
        assert_eq!(h.presenter.alerts(), vec!["CSRF token is invalid, please try again"]);
    }
}
