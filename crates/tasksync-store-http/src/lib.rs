//! HTTP-backed remote store for tasksync.

mod error;

pub use error::HttpStoreError;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tasksync_core::{
    CSRF_HEADER, Credential, CsrfHeader, CsrfToken, RemoteError, Task, TaskId, TaskTitle,
};
use tracing::debug;
use url::Url;

/// Client for the task service REST endpoints.
///
/// Session cookies set by the server are kept in the client's cookie store
/// and replayed on every request. The anti-forgery token is read from the
/// shared [`CsrfHeader`] each time a request is built.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base: String,
    csrf: CsrfHeader,
}

impl HttpStore {
    /// Build a store rooted at `base_url`.
    ///
    /// # Errors
    /// Returns an error if the URL is malformed, is not http(s), or the
    /// HTTP client cannot be initialized.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        csrf: CsrfHeader,
    ) -> Result<Self, HttpStoreError> {
        let parsed = Url::parse(base_url).map_err(|source| HttpStoreError::InvalidBaseUrl {
            url: base_url.to_owned(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(HttpStoreError::UnsupportedScheme(parsed.scheme().to_owned()));
        }
        let client = Client::builder().cookie_store(true).timeout(timeout).build()?;
        Ok(Self {
            client,
            base: parsed.as_str().trim_end_matches('/').to_owned(),
            csrf,
        })
    }

    /// Header slot shared with the token manager.
    #[must_use]
    pub const fn csrf_header(&self) -> &CsrfHeader {
        &self.csrf
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `GET /csrf`.
    ///
    /// # Errors
    /// Returns a [`RemoteError`] when the call fails or the body is malformed.
    pub async fn fetch_csrf_token(&self) -> Result<CsrfToken, RemoteError> {
        let response = send(self.request(Method::GET, "/csrf")).await?;
        decode(response).await
    }

    /// `POST /signup`.
    ///
    /// # Errors
    /// Returns a [`RemoteError`] when the server rejects the registration.
    pub async fn sign_up(&self, credential: &Credential) -> Result<(), RemoteError> {
        send(self.request(Method::POST, "/signup").json(credential))
            .await
            .map(drop)
    }

    /// `POST /login`.
    ///
    /// # Errors
    /// Returns a [`RemoteError`] when the server rejects the credential.
    pub async fn log_in(&self, credential: &Credential) -> Result<(), RemoteError> {
        send(self.request(Method::POST, "/login").json(credential))
            .await
            .map(drop)
    }

    /// `POST /logout`.
    ///
    /// # Errors
    /// Returns a [`RemoteError`] when the call fails.
    pub async fn log_out(&self) -> Result<(), RemoteError> {
        send(self.request(Method::POST, "/logout")).await.map(drop)
    }

    /// `GET /tasks`.
    ///
    /// # Errors
    /// Returns a [`RemoteError`] when the call fails or the body is malformed.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, RemoteError> {
        let response = send(self.request(Method::GET, "/tasks")).await?;
        decode(response).await
    }

    /// `POST /tasks`.
    ///
    /// # Errors
    /// Returns a [`RemoteError`] when the call fails or the body is malformed.
    pub async fn create_task(&self, body: &TaskTitle) -> Result<Task, RemoteError> {
        let response = send(self.request(Method::POST, "/tasks").json(body)).await?;
        decode(response).await
    }

    /// `PUT /tasks/{id}`.
    ///
    /// # Errors
    /// Returns a [`RemoteError`] when the call fails or the body is malformed.
    pub async fn update_task(&self, id: TaskId, body: &TaskTitle) -> Result<Task, RemoteError> {
        let path = format!("/tasks/{id}");
        let response = send(self.request(Method::PUT, &path).json(body)).await?;
        decode(response).await
    }

    /// `DELETE /tasks/{id}`.
    ///
    /// # Errors
    /// Returns a [`RemoteError`] when the call fails.
    pub async fn delete_task(&self, id: TaskId) -> Result<(), RemoteError> {
        let path = format!("/tasks/{id}");
        send(self.request(Method::DELETE, &path)).await.map(drop)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base);
        debug!(%method, %url, "sending request");
        let builder = self.client.request(method, url);
        match self.csrf.current() {
            Some(token) => builder.header(CSRF_HEADER, token),
            None => builder,
        }
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, RemoteError> {
    let response = builder.send().await.map_err(transport_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // A body that cannot be read is treated as empty; the classifier
    // then falls back to its generic message.
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), %body, "request rejected");
    Err(RemoteError::rejected(status.as_u16(), body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.to_string())
}
