//! Navigation side effects triggered by session changes.

/// Moves the user to another screen. Implemented by the host UI.
pub trait Navigator: Send + Sync {
    /// Send the user to the login entry point at `route`.
    fn navigate_to_login(&self, route: &str);
}

/// Navigator that only records the request in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate_to_login(&self, route: &str) {
        tracing::info!(route = %route, "Navigation to login requested");
    }
}
