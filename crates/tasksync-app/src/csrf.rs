//! Anti-forgery token lifecycle.

use std::sync::Arc;

use tasksync_core::{CsrfHeader, RemoteError};
use tracing::{debug, info};

use crate::remote::RemoteStore;

/// Fetches anti-forgery tokens and installs them as the default header.
pub struct CsrfTokenManager<R> {
    remote: Arc<R>,
    header: CsrfHeader,
}

impl<R> CsrfTokenManager<R> {
    /// Construct a manager writing into `header`.
    pub const fn new(remote: Arc<R>, header: CsrfHeader) -> Self {
        Self { remote, header }
    }

    /// Header slot this manager writes into.
    pub const fn header(&self) -> &CsrfHeader {
        &self.header
    }
}

impl<R: RemoteStore> CsrfTokenManager<R> {
    /// Fetch the first token at process start.
    ///
    /// # Errors
    /// Returns the store's rejection; the header is left untouched.
    pub async fn prime(&self) -> Result<(), RemoteError> {
        self.install_fresh().await?;
        info!("csrf token primed");
        Ok(())
    }

    /// Fetch a replacement after the server rejected the current token.
    ///
    /// # Errors
    /// Returns the store's rejection; the header is left untouched.
    pub async fn refresh(&self) -> Result<(), RemoteError> {
        self.install_fresh().await?;
        info!("csrf token refreshed");
        Ok(())
    }

    async fn install_fresh(&self) -> Result<(), RemoteError> {
        debug!("fetching csrf token");
        let token = self.remote.fetch_csrf_token().await?;
        self.header.install(token.csrf_token);
        Ok(())
    }
}
