//! Error types surfaced by remote store implementations.

use serde_json::Value;
use thiserror::Error;

/// Failure of a single call against the remote task store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The server answered with a non-success status.
    #[error("Request rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// No response was received (connection refused, timeout, TLS, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A success response carried a body that could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Build a rejection from a status code and raw body.
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            body: body.into(),
        }
    }

    /// Extract the server-reported failure message.
    ///
    /// A JSON object body yields its `message` field, a JSON string body
    /// yields the string itself, and any other non-empty body is returned
    /// verbatim. Returns `None` when there is no usable body at all.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        let Self::Rejected { body, .. } = self else {
            return None;
        };
        if body.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => match map.get("message") {
                Some(Value::String(message)) => Some(message.clone()),
                _ => Some(body.clone()),
            },
            Ok(Value::String(message)) => Some(message),
            _ => Some(body.clone()),
        }
    }
}
