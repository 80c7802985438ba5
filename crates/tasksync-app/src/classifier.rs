//! Classification of server-reported failures and the side effects they trigger.

use std::sync::Arc;

use tasksync_core::RemoteError;
use tracing::warn;

use crate::csrf::CsrfTokenManager;
use crate::edit_state::EditState;
use crate::presenter::{Presenter, View};
use crate::remote::RemoteStore;

/// Text shown when a failure carries no usable body.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while processing your request.";

/// Failure messages the task service is known to emit.
pub mod messages {
    /// The anti-forgery token was missing or stale.
    pub const INVALID_CSRF_TOKEN: &str = "invalid csrf token";
    /// The session token has expired.
    pub const EXPIRED_JWT: &str = "invalid or expired jwt";
    /// No session token, or an unparsable one.
    pub const MALFORMED_JWT: &str = "missing or malformed jwt";
    /// Registration with an identifier that already exists.
    pub const DUPLICATED_KEY: &str = "duplicated key not allowed";
    /// Sign-in with the wrong password.
    pub const PASSWORD_MISMATCH: &str =
        "crypto/bcrypt: hashedPassword is not the hash of the given password";
    /// Sign-in with an unknown identifier.
    pub const RECORD_NOT_FOUND: &str = "record not found";
}

/// Kind of failure, keyed by the server message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Anti-forgery rejection.
    InvalidCsrfToken,
    /// Session-fatal: expired session token.
    ExpiredSession,
    /// Session-fatal: missing or malformed session token.
    MalformedSession,
    /// Validation: identifier already registered.
    DuplicateKey,
    /// Validation: wrong password.
    PasswordMismatch,
    /// Validation: unknown identifier.
    RecordNotFound,
    /// Anything else, surfaced verbatim.
    Other,
}

/// Side effect attached to a classified failure, beyond the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Alert only; the user can fix the input and resubmit.
    Notify,
    /// Fetch a new anti-forgery token. The rejected request is not replayed.
    RefreshCsrf,
    /// Reset the composer and return to the entry view.
    EndSession,
}

impl ErrorKind {
    /// Map a server message onto its kind.
    #[must_use]
    pub fn from_message(message: &str) -> Self {
        match message {
            messages::INVALID_CSRF_TOKEN => Self::InvalidCsrfToken,
            messages::EXPIRED_JWT => Self::ExpiredSession,
            messages::MALFORMED_JWT => Self::MalformedSession,
            messages::DUPLICATED_KEY => Self::DuplicateKey,
            messages::PASSWORD_MISMATCH => Self::PasswordMismatch,
            messages::RECORD_NOT_FOUND => Self::RecordNotFound,
            _ => Self::Other,
        }
    }

    /// Alert text for known kinds; `None` means "show the raw message".
    #[must_use]
    pub const fn alert(self) -> Option<&'static str> {
        match self {
            Self::InvalidCsrfToken => Some("CSRF token is invalid, please try again"),
            Self::ExpiredSession => Some("access token expired, please login"),
            Self::MalformedSession => Some("access token is not valid, please login"),
            Self::DuplicateKey => Some("email already exist, please use another one"),
            Self::PasswordMismatch => Some("password is not correct"),
            Self::RecordNotFound => Some("email is not correct"),
            Self::Other => None,
        }
    }

    /// Side effect table.
    #[must_use]
    pub const fn effect(self) -> Effect {
        match self {
            Self::InvalidCsrfToken => Effect::RefreshCsrf,
            Self::ExpiredSession | Self::MalformedSession => Effect::EndSession,
            Self::DuplicateKey | Self::PasswordMismatch | Self::RecordNotFound | Self::Other => {
                Effect::Notify
            }
        }
    }

    /// Whether the session can no longer be used.
    #[must_use]
    pub const fn is_session_fatal(self) -> bool {
        matches!(self.effect(), Effect::EndSession)
    }
}

/// What to do about one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Classified kind.
    pub kind: ErrorKind,
    /// Notification text.
    pub alert: String,
    /// Additional side effect.
    pub effect: Effect,
}

/// Classify a server message. Pure and total.
#[must_use]
pub fn classify(message: &str) -> Action {
    let kind = ErrorKind::from_message(message);
    Action {
        kind,
        alert: kind.alert().unwrap_or(message).to_owned(),
        effect: kind.effect(),
    }
}

/// Message the classifier should see for `err`.
#[must_use]
pub fn failure_message(err: &RemoteError) -> String {
    err.server_message()
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_owned())
}

/// Executes the [`Action`] of every rejected remote call.
pub struct ErrorDispatcher<R, P> {
    tokens: CsrfTokenManager<R>,
    presenter: Arc<P>,
    edit: EditState,
}

impl<R, P> ErrorDispatcher<R, P> {
    /// Wire a dispatcher to the shared client state.
    ///
    /// Session and cache are not handed over: only login and logout change them.
    pub const fn new(tokens: CsrfTokenManager<R>, presenter: Arc<P>, edit: EditState) -> Self {
        Self {
            tokens,
            presenter,
            edit,
        }
    }
}

impl<R: RemoteStore, P: Presenter> ErrorDispatcher<R, P> {
    /// Classify `err`, notify the user and run the attached effect.
    ///
    /// Never fails: a token refresh that itself fails is only logged.
    pub async fn dispatch(&self, err: &RemoteError) -> Action {
        let message = failure_message(err);
        let action = classify(&message);
        warn!(%err, kind = ?action.kind, "remote call rejected");

        self.presenter.alert(&action.alert);
        match action.effect {
            Effect::Notify => {}
            Effect::RefreshCsrf => {
                if let Err(refresh_err) = self.tokens.refresh().await {
                    warn!(%refresh_err, "csrf token refresh failed");
                }
            }
            Effect::EndSession => {
                self.edit.reset();
                self.presenter.navigate(View::Entry);
            }
        }
        action
    }
}
