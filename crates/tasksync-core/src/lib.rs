//! Domain types shared by the tasksync store and application layers.

/// Anti-forgery header slot.
pub mod csrf;
/// Remote call failures.
pub mod error;
/// Identifier types.
pub mod id;

pub use crate::csrf::{CSRF_HEADER, CsrfHeader};
pub use crate::error::RemoteError;
pub use crate::id::TaskId;

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;

/// Task as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier.
    pub id: TaskId,
    /// Human-readable title.
    pub title: String,
    /// Creation time reported by the server.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last modification time reported by the server.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Which remote call submitting the composer will issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerMode {
    /// The composer holds a task that does not exist yet.
    Create,
    /// The composer holds an existing task.
    Update,
}

impl ComposerMode {
    /// Label shown on the submit control.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
        }
    }
}

/// Task currently held by the composer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditedTask {
    /// [`TaskId::SENTINEL`] while composing a new task.
    pub id: TaskId,
    /// Title being typed.
    pub title: String,
}

impl EditedTask {
    /// The "nothing being edited" value.
    #[must_use]
    pub const fn sentinel() -> Self {
        Self {
            id: TaskId::SENTINEL,
            title: String::new(),
        }
    }

    /// Composer holding an existing task.
    pub fn existing(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    /// Returns true while the composer is in create mode.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        self.id.is_sentinel()
    }

    /// Create or update, derived from the id alone.
    #[must_use]
    pub const fn mode(&self) -> ComposerMode {
        if self.is_sentinel() {
            ComposerMode::Create
        } else {
            ComposerMode::Update
        }
    }

    /// The submit control is enabled only with a non-empty title.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.title.is_empty()
    }
}

impl From<&Task> for EditedTask {
    fn from(task: &Task) -> Self {
        Self::existing(task.id, task.title.clone())
    }
}

/// Sign-in material. Never stored past the request that uses it.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Credential {
    /// Account identifier.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

impl Credential {
    /// Construct a credential.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields are required before the form may be submitted.
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload of `GET /csrf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrfToken {
    /// Token to echo back in the anti-forgery header.
    pub csrf_token: String,
}

/// Body of `POST /tasks` and `PUT /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTitle {
    /// New title.
    pub title: String,
}

impl TaskTitle {
    /// Wrap a title for the wire.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}
