//! Application layer for tasksync.
//!
//! Keeps a local task list, the composer state and the authentication state in
//! sync with a remote task store, and routes every rejection through a single
//! classifier that decides what the user sees and what state gets reset.

pub mod classifier;
pub mod client;
pub mod config;
pub mod csrf;
pub mod edit_state;
pub mod error;
pub mod presenter;
pub mod remote;
pub mod session;
pub mod task_cache;
pub mod task_query;
pub mod task_sync;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use classifier::{Action, Effect, ErrorDispatcher, ErrorKind, GENERIC_FAILURE_MESSAGE, classify};
pub use client::Client;
pub use config::{API_URL_ENV, ClientConfig, default_config_path};
pub use csrf::CsrfTokenManager;
pub use edit_state::EditState;
pub use error::{InvalidInput, SyncError};
pub use presenter::{Presenter, View};
pub use remote::RemoteStore;
pub use session::{AuthForm, AuthMode, AuthState, SessionController, SessionState};
pub use task_cache::TaskCache;
pub use task_query::TaskQuery;
pub use task_sync::TaskSynchronizer;
