//! Debounced state saves
//!
//! Every change schedules a save after a fixed delay. Each schedule takes a
//! new token; when a timer fires, only the one holding the newest token
//! writes. A burst of changes therefore produces a single write, one delay
//! after the last change.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::runtime::HostRuntime;

use super::persisted::StateStore;

/// Coalesces state saves scheduled through the host runtime
pub struct SaveScheduler {
    delay: Duration,
    runtime: Arc<dyn HostRuntime>,
    store: Arc<StateStore>,
    pending: Arc<AtomicUsize>,
    latest: Arc<AtomicU64>,
}

impl SaveScheduler {
    pub fn new(store: Arc<StateStore>, runtime: Arc<dyn HostRuntime>, delay: Duration) -> Self {
        Self {
            delay,
            runtime,
            store,
            pending: Arc::new(AtomicUsize::new(0)),
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Schedule a save
    pub fn schedule(&self) {
        let token = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.pending.fetch_add(1, Ordering::SeqCst);

        let pending = Arc::clone(&self.pending);
        let latest = Arc::clone(&self.latest);
        let store = Arc::clone(&self.store);

        self.runtime.timed_call(
            self.delay,
            Box::new(move || {
                pending.fetch_sub(1, Ordering::SeqCst);
                if latest.load(Ordering::SeqCst) == token {
                    store.save();
                } else {
                    log::trace!("Save {} superseded", token);
                }
            }),
        );
    }

    /// Save right away
    ///
    /// Saves still waiting on their timer become no-ops.
    pub fn flush(&self) -> bool {
        self.latest.fetch_add(1, Ordering::SeqCst);
        self.store.save()
    }

    /// Scheduled saves whose timer has not fired yet
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::persisted::PersistedState;
    use crate::test_fixtures::ManualRuntime;
    use tempfile::TempDir;

    const DELAY: Duration = Duration::from_millis(100);

    fn scheduler(dir: &TempDir) -> (Arc<ManualRuntime>, Arc<StateStore>, SaveScheduler) {
        let runtime = Arc::new(ManualRuntime::new());
        let store = Arc::new(StateStore::with_state(
            dir.path().join("state.msgp"),
            PersistedState::default(),
        ));
        let scheduler = SaveScheduler::new(Arc::clone(&store), runtime.clone(), DELAY);
        (runtime, store, scheduler)
    }

    #[test]
    fn test_burst_produces_single_write() {
        let temp_dir = TempDir::new().unwrap();
        let (runtime, store, scheduler) = scheduler(&temp_dir);

        for _ in 0..5 {
            scheduler.schedule();
            runtime.advance(Duration::from_millis(10));
        }
        assert_eq!(scheduler.pending(), 5);
        assert_eq!(store.write_count(), 0);

        runtime.advance(DELAY);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_spaced_changes_write_each_time() {
        let temp_dir = TempDir::new().unwrap();
        let (runtime, store, scheduler) = scheduler(&temp_dir);

        scheduler.schedule();
        runtime.advance(DELAY);
        scheduler.schedule();
        runtime.advance(DELAY);

        assert_eq!(store.write_count(), 2);
    }

    #[test]
    fn test_nothing_written_before_delay() {
        let temp_dir = TempDir::new().unwrap();
        let (runtime, store, scheduler) = scheduler(&temp_dir);

        scheduler.schedule();
        runtime.advance(DELAY - Duration::from_millis(1));
        assert_eq!(store.write_count(), 0);
        assert!(!store.path().exists());

        runtime.advance(Duration::from_millis(1));
        assert_eq!(store.write_count(), 1);
        assert!(store.path().exists());
    }

    #[test]
    fn test_flush_cancels_scheduled_writes() {
        let temp_dir = TempDir::new().unwrap();
        let (runtime, store, scheduler) = scheduler(&temp_dir);

        scheduler.schedule();
        scheduler.schedule();
        assert!(scheduler.flush());
        assert_eq!(store.write_count(), 1);

        runtime.advance(DELAY);
        assert_eq!(store.write_count(), 1);
        assert_eq!(scheduler.pending(), 0);
    }
}
