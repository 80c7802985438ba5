use std::sync::{Arc, PoisonError, RwLock};

/// Header carrying the anti-forgery token on outbound requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Process-wide default value of the [`CSRF_HEADER`] header.
///
/// Clones share the same slot: the transport reads it when building each
/// request and the token manager overwrites it after every fetch.
#[derive(Debug, Clone, Default)]
pub struct CsrfHeader {
    token: Arc<RwLock<Option<String>>>,
}

impl CsrfHeader {
    /// Create an empty header slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current token. Last write wins.
    pub fn install(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Token to attach to the next request, if one has been installed.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
