//! Host application runtime
//!
//! The state layer never owns the event loop. Whatever hosts it (a mobile
//! shell, a desktop window, the CLI) provides redraw requests, delayed
//! callbacks and the keep-screen-on switch through [`HostRuntime`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Callback scheduled with [`HostRuntime::timed_call`]
pub type TimedCallback = Box<dyn FnOnce() + Send + 'static>;

/// Services the host application provides to the state layer
pub trait HostRuntime: Send + Sync {
    /// Ask the host to redraw immediately
    fn force_update(&self);

    /// Run `callback` once after `delay`
    fn timed_call(&self, delay: Duration, callback: TimedCallback);

    /// Keep the display awake while reading
    fn set_keep_screen_on(&self, keep_on: bool);
}

/// Host runtime backed by a tokio runtime
///
/// Timed calls are spawned as tasks that sleep and then run the callback.
pub struct TokioRuntime {
    handle: tokio::runtime::Handle,
    keep_screen_on: AtomicBool,
    update_requests: AtomicUsize,
}

impl TokioRuntime {
    /// Create a runtime bound to the tokio runtime of the calling context
    ///
    /// Fails when called outside of a tokio runtime.
    pub fn current() -> Result<Self, String> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| format!("No tokio runtime available: {}", e))?;
        Ok(Self::with_handle(handle))
    }

    pub fn with_handle(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle,
            keep_screen_on: AtomicBool::new(false),
            update_requests: AtomicUsize::new(0),
        }
    }

    /// Whether a wake lock is currently requested
    pub fn keep_screen_on(&self) -> bool {
        self.keep_screen_on.load(Ordering::SeqCst)
    }

    /// Number of redraws requested so far
    pub fn update_requests(&self) -> usize {
        self.update_requests.load(Ordering::SeqCst)
    }
}

impl HostRuntime for TokioRuntime {
    fn force_update(&self) {
        self.update_requests.fetch_add(1, Ordering::SeqCst);
        log::trace!("Redraw requested");
    }

    fn timed_call(&self, delay: Duration, callback: TimedCallback) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
    }

    fn set_keep_screen_on(&self, keep_on: bool) {
        self.keep_screen_on.store(keep_on, Ordering::SeqCst);
        log::debug!("Keep screen on: {}", keep_on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_current_outside_runtime_fails() {
        assert!(TokioRuntime::current().is_err());
    }

    #[tokio::test]
    async fn test_timed_call_runs_after_delay() {
        let runtime = TokioRuntime::current().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();

        runtime.timed_call(
            Duration::from_millis(5),
            Box::new(move || {
                let _ = tx.send(42);
            }),
        );

        assert_eq!(rx.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_keep_screen_on_and_updates() {
        let runtime = Arc::new(TokioRuntime::current().unwrap());
        assert!(!runtime.keep_screen_on());

        runtime.set_keep_screen_on(true);
        runtime.force_update();
        runtime.force_update();

        assert!(runtime.keep_screen_on());
        assert_eq!(runtime.update_requests(), 2);
    }
}
