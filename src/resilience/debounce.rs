//! Debounced callables.
//!
//! A call schedules the wrapped function after `wait`; every new call within
//! the window cancels the pending run and restarts the timer. In immediate
//! mode the first call of a quiet window runs synchronously and the calls
//! that follow only extend the window.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

type Callback<A> = Arc<dyn Fn(A) + Send + Sync>;

/// A debounced wrapper around `Fn(A)`.
///
/// [`Debouncer::call`] spawns a timer task and therefore needs a Tokio runtime.
pub struct Debouncer<A> {
    f: Callback<A>,
    wait: Duration,
    immediate: bool,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F>(f: F, wait: Duration, immediate: bool) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            wait,
            immediate,
            pending: Mutex::new(None),
        }
    }

    /// Register an invocation attempt with `args`.
    pub fn call(&self, args: A) {
        let mut pending = self.lock_pending();
        let quiet = pending.as_ref().map_or(true, |handle| handle.is_finished());
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let wait = self.wait;
        if self.immediate {
            *pending = Some(tokio::spawn(async move {
                tokio::time::sleep(wait).await;
            }));
            drop(pending);
            if quiet {
                (self.f)(args);
            }
        } else {
            let f = self.f.clone();
            *pending = Some(tokio::spawn(async move {
                tokio::time::sleep(wait).await;
                f(args);
            }));
        }
    }

    /// Drop any pending run without executing it.
    pub fn cancel(&self) {
        if let Some(previous) = self.lock_pending().take() {
            previous.abort();
        }
    }

    /// Whether a window is currently open.
    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock_pending(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}

/// Shorthand for [`Debouncer::new`].
pub fn debounce<A, F>(f: F, wait: Duration, immediate: bool) -> Debouncer<A>
where
    A: Send + 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    Debouncer::new(f, wait, immediate)
}
