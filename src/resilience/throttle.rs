//! Throttled callables.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Runs the wrapped function at most once per `limit`.
///
/// Calls made while the window is closed are dropped, not deferred.
pub struct Throttle<A> {
    f: Box<dyn Fn(A) + Send + Sync>,
    limit: Duration,
    reopens_at: Mutex<Option<Instant>>,
}

impl<A> Throttle<A> {
    pub fn new<F>(f: F, limit: Duration) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            f: Box::new(f),
            limit,
            reopens_at: Mutex::new(None),
        }
    }

    /// Invoke `f(args)` if the window is open. Returns whether it ran.
    pub fn call(&self, args: A) -> bool {
        {
            let mut reopens_at = self
                .reopens_at
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let now = Instant::now();
            if reopens_at.is_some_and(|at| now < at) {
                return false;
            }
            *reopens_at = Some(now + self.limit);
        }
        (self.f)(args);
        true
    }
}
