//! Error types for building an `HttpStore`.

use thiserror::Error;

/// Errors that can occur while constructing an `HttpStore`.
#[derive(Error, Debug)]
pub enum HttpStoreError {
    /// The configured base URL could not be parsed.
    #[error("Invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// Offending value.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// The base URL uses a scheme other than http or https.
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// The underlying HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
