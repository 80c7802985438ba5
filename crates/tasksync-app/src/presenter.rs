//! User-facing collaborators: notifications and navigation.

/// Screens the client can navigate between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Anonymous entry point with the login/register form.
    Entry,
    /// Authenticated task list and composer.
    Tasks,
}

impl View {
    /// Route path of the view.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Entry => "/",
            Self::Tasks => "/todo",
        }
    }
}

/// Surface that shows notifications and switches views.
///
/// The synchronization layer never renders anything itself; it reports
/// through this trait.
pub trait Presenter {
    /// Show a single blocking notification.
    fn alert(&self, message: &str);

    /// Switch to `view`.
    fn navigate(&self, view: View);
}
