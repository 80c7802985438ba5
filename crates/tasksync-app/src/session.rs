//! Authentication state machine and the controller driving it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tasksync_core::Credential;
use tracing::info;

use crate::classifier::ErrorDispatcher;
use crate::edit_state::EditState;
use crate::error::{InvalidInput, SyncError};
use crate::presenter::{Presenter, View};
use crate::remote::RemoteStore;
use crate::task_cache::TaskCache;

/// Whether the client holds a usable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No session.
    #[default]
    Anonymous,
    /// Signed in; session cookie held by the transport.
    Authenticated,
}

#[derive(Debug, Default)]
struct SessionInner {
    state: AuthState,
    pending: bool,
    generation: u64,
}

/// Shared authentication state. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<Mutex<SessionInner>>,
}

impl SessionState {
    /// Create an anonymous session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state.
    #[must_use]
    pub fn get(&self) -> AuthState {
        self.lock().state
    }

    /// Shorthand for `get() == Authenticated`.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.get() == AuthState::Authenticated
    }

    /// Counter bumped on every [`begin`](Self::begin) and [`end`](Self::end).
    ///
    /// A reader compares it before and after an await to tell whether the
    /// session it started in is still the current one.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Enter [`AuthState::Authenticated`].
    pub fn begin(&self) {
        self.set(AuthState::Authenticated);
    }

    /// Return to [`AuthState::Anonymous`].
    pub fn end(&self) {
        self.set(AuthState::Anonymous);
    }

    fn set(&self, state: AuthState) {
        let mut inner = self.lock();
        inner.state = state;
        inner.generation = inner.generation.wrapping_add(1);
    }

    /// Whether a login/register/logout call is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    fn start_transition(&self) -> Result<Transition, InvalidInput> {
        let mut inner = self.lock();
        if inner.pending {
            return Err(InvalidInput::TransitionPending);
        }
        inner.pending = true;
        drop(inner);
        Ok(Transition {
            session: self.clone(),
        })
    }
}

/// Marks a transition as pending until dropped.
struct Transition {
    session: SessionState,
}

impl Drop for Transition {
    fn drop(&mut self) {
        self.session.lock().pending = false;
    }
}

/// Which call submitting the auth form issues. Purely client-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Sign in with an existing account.
    #[default]
    Login,
    /// Create an account, then sign in.
    Register,
}

impl AuthMode {
    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Register,
            Self::Register => Self::Login,
        }
    }

    /// Form heading.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Create a new account",
        }
    }

    /// Submit control label.
    #[must_use]
    pub const fn submit_label(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Sign Up",
        }
    }
}

/// Contents of the login/register form.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    /// Login or register.
    pub mode: AuthMode,
    /// Typed credential.
    pub credential: Credential,
}

impl AuthForm {
    /// Flip between login and register.
    pub fn toggle(&mut self) {
        self.mode = self.mode.toggled();
    }

    /// Submit is enabled only with both fields filled.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.credential.is_submittable()
    }
}

/// Drives login, registration and logout.
pub struct SessionController<R, P> {
    remote: Arc<R>,
    presenter: Arc<P>,
    errors: Arc<ErrorDispatcher<R, P>>,
    edit: EditState,
    cache: TaskCache,
    session: SessionState,
}

impl<R, P> SessionController<R, P> {
    /// Wire a controller to the shared client state.
    pub const fn new(
        remote: Arc<R>,
        presenter: Arc<P>,
        errors: Arc<ErrorDispatcher<R, P>>,
        edit: EditState,
        cache: TaskCache,
        session: SessionState,
    ) -> Self {
        Self {
            remote,
            presenter,
            errors,
            edit,
            cache,
            session,
        }
    }

    /// Shared authentication state.
    pub const fn state(&self) -> &SessionState {
        &self.session
    }
}

impl<R: RemoteStore, P: Presenter> SessionController<R, P> {
    /// Submit the auth form in its current mode.
    ///
    /// # Errors
    /// See [`login`](Self::login) and [`register`](Self::register).
    pub async fn submit(&self, form: &AuthForm) -> Result<(), SyncError> {
        match form.mode {
            AuthMode::Login => self.login(&form.credential).await,
            AuthMode::Register => self.register(&form.credential).await,
        }
    }

    /// Sign in and move to the task view.
    ///
    /// # Errors
    /// [`InvalidInput`] for an incomplete credential or a pending transition;
    /// [`SyncError::Rejected`] after the rejection has been dispatched.
    pub async fn login(&self, credential: &Credential) -> Result<(), SyncError> {
        ensure_complete(credential)?;
        let _transition = self.session.start_transition()?;
        self.log_in(credential).await
    }

    /// Create an account, then sign in with the same credential.
    ///
    /// # Errors
    /// As for [`login`](Self::login); a rejected sign-up skips the sign-in.
    pub async fn register(&self, credential: &Credential) -> Result<(), SyncError> {
        ensure_complete(credential)?;
        let _transition = self.session.start_transition()?;
        if let Err(err) = self.remote.sign_up(credential).await {
            return Err(self.errors.dispatch(&err).await.into());
        }
        info!(email = %credential.email, "account registered");
        self.log_in(credential).await
    }

    /// Close the session and drop everything cached for it.
    ///
    /// # Errors
    /// [`InvalidInput::TransitionPending`] or [`SyncError::Rejected`]; on
    /// rejection the session is left as it was.
    pub async fn logout(&self) -> Result<(), SyncError> {
        let _transition = self.session.start_transition()?;
        if let Err(err) = self.remote.log_out().await {
            return Err(self.errors.dispatch(&err).await.into());
        }
        self.edit.reset();
        self.cache.clear();
        self.session.end();
        info!("logged out");
        self.presenter.navigate(View::Entry);
        Ok(())
    }

    async fn log_in(&self, credential: &Credential) -> Result<(), SyncError> {
        if let Err(err) = self.remote.log_in(credential).await {
            return Err(self.errors.dispatch(&err).await.into());
        }
        self.session.begin();
        info!(email = %credential.email, "logged in");
        self.presenter.navigate(View::Tasks);
        Ok(())
    }
}

fn ensure_complete(credential: &Credential) -> Result<(), InvalidInput> {
    if credential.is_submittable() {
        Ok(())
    } else {
        Err(InvalidInput::IncompleteCredential)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::classifier::{ErrorKind, GENERIC_FAILURE_MESSAGE, messages};
    use crate::testing::{Call, Endpoint, MockRemote, harness, rejection, task};
    use tasksync_core::{EditedTask, RemoteError, TaskId};

    fn credential() -> Credential {
        Credential::new("user@example.com", "secret")
    }

    #[tokio::test]
    async fn login_authenticates_and_opens_task_view() {
        let h = harness(MockRemote::default());
        h.client.session().login(&credential()).await.expect("login");

        assert_eq!(h.client.session().state().get(), AuthState::Authenticated);
        assert_eq!(h.presenter.views(), vec![View::Tasks]);
        assert_eq!(h.remote.calls(), vec![Call::LogIn("user@example.com".into())]);
        assert!(!h.client.session().state().is_pending());
    }

    #[tokio::test]
    async fn rejected_login_stays_anonymous() {
        let h = harness(MockRemote::default());
        h.remote.fail(Endpoint::LogIn, rejection(messages::PASSWORD_MISMATCH));

        let err = h.client.session().login(&credential()).await.expect_err("must fail");
        assert_eq!(err.kind(), Some(ErrorKind::PasswordMismatch));
        assert_eq!(h.client.session().state().get(), AuthState::Anonymous);
        assert_eq!(h.presenter.alerts(), vec!["password is not correct"]);
        assert!(h.presenter.views().is_empty());
        assert!(!h.client.session().state().is_pending());
    }

    #[tokio::test]
    async fn incomplete_credential_is_not_sent() {
        let h = harness(MockRemote::default());
        let err = h
            .client
            .session()
            .login(&Credential::new("user@example.com", ""))
            .await
            .expect_err("must fail");
        assert_eq!(err, SyncError::Invalid(InvalidInput::IncompleteCredential));
        assert!(h.remote.calls().is_empty());
        assert!(h.presenter.alerts().is_empty());
    }

    #[tokio::test]
    async fn register_chains_into_login() {
        let h = harness(MockRemote::default());
        h.client.session().register(&credential()).await.expect("register");

        assert_eq!(
            h.remote.calls(),
            vec![
                Call::SignUp("user@example.com".into()),
                Call::LogIn("user@example.com".into()),
            ]
        );
        assert!(h.client.session().state().is_authenticated());
        assert_eq!(h.presenter.views(), vec![View::Tasks]);
    }

    #[tokio::test]
    async fn duplicate_registration_skips_login() {
        let h = harness(MockRemote::default());
        h.remote.fail(Endpoint::SignUp, rejection(messages::DUPLICATED_KEY));

        let err = h.client.session().register(&credential()).await.expect_err("must fail");
        assert_eq!(err.kind(), Some(ErrorKind::DuplicateKey));
        assert_eq!(h.remote.calls(), vec![Call::SignUp("user@example.com".into())]);
        assert_eq!(
            h.presenter.alerts(),
            vec!["email already exist, please use another one"]
        );
        assert!(!h.client.session().state().is_authenticated());
    }

    #[tokio::test]
    async fn register_without_response_body_uses_generic_message() {
        let h = harness(MockRemote::default());
        h.remote
            .fail(Endpoint::SignUp, RemoteError::Transport("connection refused".into()));

        let err = h.client.session().register(&credential()).await.expect_err("must fail");
        assert_eq!(err.kind(), Some(ErrorKind::Other));
        assert_eq!(h.presenter.alerts(), vec![GENERIC_FAILURE_MESSAGE]);
    }

    #[tokio::test]
    async fn auth_form_dispatches_on_mode() {
        let h = harness(MockRemote::default());
        let mut form = AuthForm {
            credential: credential(),
            ..AuthForm::default()
        };
        assert_eq!(form.mode.submit_label(), "Login");
        form.toggle();
        assert_eq!(form.mode, AuthMode::Register);
        assert_eq!(form.mode.submit_label(), "Sign Up");
        assert!(form.is_submittable());

        h.client.session().submit(&form).await.expect("register via form");
        assert_eq!(h.remote.calls()[0], Call::SignUp("user@example.com".into()));
    }

    #[tokio::test]
    async fn logout_clears_cache_and_composer() {
        let h = harness(MockRemote::with_tasks(vec![task(1, "a")]));
        h.client.session().login(&credential()).await.expect("login");
        h.client.query().load_all().await.expect("load");
        h.client.edit().set(EditedTask::existing(TaskId(1), "half edited"));

        h.client.session().logout().await.expect("logout");

        assert_eq!(h.client.edit().get(), EditedTask::sentinel());
        assert!(!h.client.cache().is_loaded());
        assert_eq!(h.client.session().state().get(), AuthState::Anonymous);
        assert_eq!(h.presenter.views(), vec![View::Tasks, View::Entry]);
    }

    #[tokio::test]
    async fn failed_logout_keeps_the_session() {
        let h = harness(MockRemote::with_tasks(vec![task(1, "a")]));
        h.client.session().login(&credential()).await.expect("login");
        h.client.query().load_all().await.expect("load");
        h.client.edit().set(EditedTask::existing(TaskId(1), "half edited"));
        h.remote
            .fail(Endpoint::LogOut, RemoteError::rejected(500, "db down"));

        let err = h.client.session().logout().await.expect_err("must fail");
        assert_eq!(err.kind(), Some(ErrorKind::Other));
        assert!(h.client.session().state().is_authenticated());
        assert!(h.client.cache().is_loaded());
        assert_eq!(h.client.edit().get().id, TaskId(1));
        assert_eq!(h.presenter.alerts(), vec!["db down"]);
    }

    #[tokio::test]
    async fn expired_token_on_logout_keeps_the_session() {
        let h = harness(MockRemote::with_tasks(vec![task(1, "a")]));
        h.client.session().login(&credential()).await.expect("login");
        h.client.query().load_all().await.expect("load");
        h.client.edit().set(EditedTask::existing(TaskId(1), "half edited"));
        h.remote.fail(Endpoint::LogOut, rejection(messages::EXPIRED_JWT));

        let err = h.client.session().logout().await.expect_err("must fail");
        assert_eq!(err.kind(), Some(ErrorKind::ExpiredSession));
        assert_eq!(h.client.session().state().get(), AuthState::Authenticated);
        assert!(h.client.cache().is_loaded());
        assert_eq!(h.client.edit().get(), EditedTask::sentinel());
        assert_eq!(h.presenter.alerts(), vec!["access token expired, please login"]);
        assert_eq!(h.presenter.views(), vec![View::Tasks, View::Entry]);
    }

    #[test]
    fn generation_moves_on_every_state_change() {
        let state = SessionState::new();
        let start = state.generation();
        state.begin();
        assert_eq!(state.generation(), start + 1);
        state.end();
        assert_eq!(state.generation(), start + 2);
        assert_eq!(state.get(), AuthState::Anonymous);
    }

    #[test]
    fn second_transition_is_refused_while_pending() {
        let state = SessionState::new();
        let first = state.start_transition().expect("first transition");
        assert!(state.is_pending());
        assert_eq!(
            state.start_transition().err(),
            Some(InvalidInput::TransitionPending)
        );
        drop(first);
        assert!(!state.is_pending());
    }
}
