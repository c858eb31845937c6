use std::time::Duration;

use parking_lot::Condvar as InnerCondvar;

use crate::core::detector::condvar as engine;
use crate::core::locks::mutex::MutexGuard;
use crate::core::types::{current_thread_id, CondvarId, ThreadId};

/// A condition variable instrumented for deadlock detection. `wait` records
/// a wait edge, then delegates the actual release-park-reacquire sequence
/// to `parking_lot::Condvar::wait`, which performs it atomically; by the
/// time that call returns the real mutex is already held again, so the
/// registry is resynced directly rather than replayed through the ordinary
/// two-phase lock path.
pub struct Condvar {
    id: CondvarId,
    inner: InnerCondvar,
}

impl Default for Condvar {
    fn default() -> Self {
        Self::new()
    }
}

impl Condvar {
    pub fn new() -> Self {
        Self::with_creator(Some(current_thread_id()))
    }

    /// Like `new`, but registers `creator` (rather than the calling thread)
    /// as the owner for cascaded-destruction purposes.
    pub fn with_creator(creator: Option<ThreadId>) -> Self {
        let id = engine::create_condvar(creator);
        Condvar {
            id,
            inner: InnerCondvar::new(),
        }
    }

    pub fn id(&self) -> CondvarId {
        self.id
    }

    pub fn wait<T>(&self, guard: &mut MutexGuard<'_, T>) {
        let tid = current_thread_id();
        let mutex_id = guard.lock_id();
        if let Err(e) = engine::begin_wait(tid, self.id, mutex_id) {
            panic!("cyclewatch: {e}");
        }

        let mut inner_guard = guard.take_inner();
        self.inner.wait(&mut inner_guard);
        guard.restore_inner(inner_guard);

        engine::end_wait(tid, self.id);
        engine::reacquire_after_wait(tid, mutex_id);
    }

    /// Like `wait`, but returns after `timeout` even if never notified.
    /// Returns `true` if the wait returned normally (signalled or
    /// spuriously), `false` on timeout.
    pub fn wait_timeout<T>(&self, guard: &mut MutexGuard<'_, T>, timeout: Duration) -> bool {
        let tid = current_thread_id();
        let mutex_id = guard.lock_id();
        if let Err(e) = engine::begin_wait(tid, self.id, mutex_id) {
            panic!("cyclewatch: {e}");
        }

        let mut inner_guard = guard.take_inner();
        let result = self.inner.wait_for(&mut inner_guard, timeout);
        guard.restore_inner(inner_guard);

        engine::end_wait(tid, self.id);
        engine::reacquire_after_wait(tid, mutex_id);
        !result.timed_out()
    }

    /// Convenience wrapper that reparks until `condition` holds true,
    /// tolerating spurious wakeups transparently (§8 property 7): a waiter
    /// that rechecks and re-waits never triggers a report on its own.
    pub fn wait_while<T, F>(&self, guard: &mut MutexGuard<'_, T>, mut condition: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        while condition(&mut *guard) {
            self.wait(guard);
        }
    }

    pub fn wait_timeout_while<T, F>(
        &self,
        guard: &mut MutexGuard<'_, T>,
        timeout: Duration,
        mut condition: F,
    ) -> bool
    where
        F: FnMut(&mut T) -> bool,
    {
        let deadline = std::time::Instant::now() + timeout;
        while condition(&mut *guard) {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if !self.wait_timeout(guard, remaining) {
                return !condition(&mut *guard);
            }
        }
        true
    }

    pub fn notify_one(&self) {
        if engine::notify_one(self.id).is_ok() {
            self.inner.notify_one();
        }
    }

    pub fn notify_all(&self) {
        if engine::notify_all(self.id).is_ok() {
            self.inner.notify_all();
        }
    }
}

impl Drop for Condvar {
    fn drop(&mut self) {
        let _ = engine::destroy_condvar(self.id);
    }
}
