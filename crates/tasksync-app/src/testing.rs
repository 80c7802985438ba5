//! In-memory doubles shared by the unit tests.

#![allow(clippy::expect_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tasksync_core::{Credential, CsrfHeader, CsrfToken, RemoteError, Task, TaskId, TaskTitle};
use time::OffsetDateTime;
use tokio::sync::oneshot;

use crate::client::Client;
use crate::presenter::{Presenter, View};
use crate::remote::RemoteStore;

pub(crate) fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn task_at(id: u64, title: &str, created: i64, updated: i64) -> Task {
    Task {
        id: TaskId(id),
        title: title.into(),
        created_at: OffsetDateTime::from_unix_timestamp(created).expect("valid timestamp"),
        updated_at: OffsetDateTime::from_unix_timestamp(updated).expect("valid timestamp"),
    }
}

pub(crate) fn task(id: u64, title: &str) -> Task {
    task_at(id, title, 0, 0)
}

pub(crate) fn rejection(message: &str) -> RemoteError {
    RemoteError::rejected(400, format!(r#"{{"message":"{message}"}}"#))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    FetchCsrf,
    SignUp(String),
    LogIn(String),
    LogOut,
    List,
    Create(String),
    Update(TaskId, String),
    Delete(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Endpoint {
    Csrf,
    SignUp,
    LogIn,
    LogOut,
    List,
    Create,
    Update,
    Delete,
}

#[derive(Default)]
pub(crate) struct MockRemote {
    inner: Mutex<MockInner>,
}

#[derive(Default)]
struct MockInner {
    calls: Vec<Call>,
    tokens_issued: u32,
    next_id: u64,
    stamp: i64,
    listed: Vec<Task>,
    failures: HashMap<Endpoint, VecDeque<RemoteError>>,
    gates: HashMap<Endpoint, oneshot::Receiver<()>>,
}

impl MockInner {
    fn record(&mut self, call: Call, endpoint: Endpoint) -> Result<(), RemoteError> {
        self.calls.push(call);
        match self.failures.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn tick(&mut self) -> i64 {
        self.stamp += 1;
        self.stamp
    }
}

impl MockRemote {
    pub(crate) fn with_tasks(tasks: Vec<Task>) -> Self {
        let remote = Self::default();
        guard(&remote.inner).listed = tasks;
        remote
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        guard(&self.inner).calls.clone()
    }

    pub(crate) fn fail(&self, endpoint: Endpoint, err: RemoteError) {
        guard(&self.inner)
            .failures
            .entry(endpoint)
            .or_default()
            .push_back(err);
    }

    pub(crate) fn fail_csrf(&self, err: RemoteError) {
        self.fail(Endpoint::Csrf, err);
    }

    /// Hold the next response from `endpoint` until `release` fires.
    pub(crate) fn gate(&self, endpoint: Endpoint, release: oneshot::Receiver<()>) {
        guard(&self.inner).gates.insert(endpoint, release);
    }

    async fn pass_gate(&self, endpoint: Endpoint) {
        let gate = guard(&self.inner).gates.remove(&endpoint);
        if let Some(release) = gate {
            let _ = release.await;
        }
    }
}

impl RemoteStore for MockRemote {
    async fn fetch_csrf_token(&self) -> Result<CsrfToken, RemoteError> {
        let mut inner = guard(&self.inner);
        inner.record(Call::FetchCsrf, Endpoint::Csrf)?;
        inner.tokens_issued += 1;
        Ok(CsrfToken {
            csrf_token: format!("token-{}", inner.tokens_issued),
        })
    }

    async fn sign_up(&self, credential: &Credential) -> Result<(), RemoteError> {
        guard(&self.inner).record(Call::SignUp(credential.email.clone()), Endpoint::SignUp)
    }

    async fn log_in(&self, credential: &Credential) -> Result<(), RemoteError> {
        guard(&self.inner).record(Call::LogIn(credential.email.clone()), Endpoint::LogIn)
    }

    async fn log_out(&self) -> Result<(), RemoteError> {
        guard(&self.inner).record(Call::LogOut, Endpoint::LogOut)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        self.pass_gate(Endpoint::List).await;
        let mut inner = guard(&self.inner);
        inner.record(Call::List, Endpoint::List)?;
        Ok(inner.listed.clone())
    }

    async fn create_task(&self, body: &TaskTitle) -> Result<Task, RemoteError> {
        let mut inner = guard(&self.inner);
        inner.record(Call::Create(body.title.clone()), Endpoint::Create)?;
        inner.next_id += 1;
        let id = 100 + inner.next_id;
        let ts = inner.tick();
        Ok(task_at(id, &body.title, ts, ts))
    }

    async fn update_task(&self, id: TaskId, body: &TaskTitle) -> Result<Task, RemoteError> {
        self.pass_gate(Endpoint::Update).await;
        let mut inner = guard(&self.inner);
        inner.record(Call::Update(id, body.title.clone()), Endpoint::Update)?;
        let ts = inner.tick();
        Ok(task_at(id.0, &body.title, 0, ts))
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), RemoteError> {
        guard(&self.inner).record(Call::Delete(id), Endpoint::Delete)
    }
}

#[derive(Default)]
pub(crate) struct RecordingPresenter {
    alerts: Mutex<Vec<String>>,
    views: Mutex<Vec<View>>,
}

impl RecordingPresenter {
    pub(crate) fn alerts(&self) -> Vec<String> {
        guard(&self.alerts).clone()
    }

    pub(crate) fn views(&self) -> Vec<View> {
        guard(&self.views).clone()
    }
}

impl Presenter for RecordingPresenter {
    fn alert(&self, message: &str) {
        guard(&self.alerts).push(message.to_owned());
    }

    fn navigate(&self, view: View) {
        guard(&self.views).push(view);
    }
}

pub(crate) struct Harness {
    pub(crate) client: Client<MockRemote, RecordingPresenter>,
    pub(crate) remote: Arc<MockRemote>,
    pub(crate) presenter: Arc<RecordingPresenter>,
    pub(crate) header: CsrfHeader,
}

pub(crate) fn harness(remote: MockRemote) -> Harness {
    let remote = Arc::new(remote);
    let presenter = Arc::new(RecordingPresenter::default());
    let header = CsrfHeader::new();
    let client = Client::new(Arc::clone(&remote), Arc::clone(&presenter), header.clone());
    Harness {
        client,
        remote,
        presenter,
        header,
    }
}
