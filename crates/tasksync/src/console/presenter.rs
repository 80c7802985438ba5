use std::sync::{Mutex, MutexGuard, PoisonError};

use tasksync_app::{Presenter, View};
use tracing::debug;

/// Collects alerts and navigations until the console loop prints them.
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    alerts: Mutex<Vec<String>>,
    navigation: Mutex<Option<View>>,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ConsolePresenter {
    pub fn take_alerts(&self) -> Vec<String> {
        std::mem::take(&mut *guard(&self.alerts))
    }

    /// Most recent navigation since the last call.
    pub fn take_navigation(&self) -> Option<View> {
        guard(&self.navigation).take()
    }
}

impl Presenter for ConsolePresenter {
    fn alert(&self, message: &str) {
        guard(&self.alerts).push(message.to_owned());
    }

    fn navigate(&self, view: View) {
        debug!(path = view.path(), "navigate");
        *guard(&self.navigation) = Some(view);
    }
}
