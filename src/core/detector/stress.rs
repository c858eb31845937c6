use std::time::Duration;

use crate::core::detector::{Detector, GLOBAL_DETECTOR};
use crate::core::stress::calculate_stress_delay;
use crate::core::types::{LockId, ThreadId};

impl Detector {
    pub fn stress_delay_for(&self, thread_id: ThreadId, lock_id: LockId) -> Option<Duration> {
        let config = self.stress_config.as_ref()?;
        let held_locks: Vec<LockId> = self
            .registry
            .threads
            .get(&thread_id)
            .map(|t| t.holds.iter().copied().collect())
            .unwrap_or_default();
        calculate_stress_delay(self.stress_mode, thread_id, lock_id, &held_locks, config)
            .map(Duration::from_micros)
    }
}

/// Looks up the configured stress delay for an about-to-block acquisition,
/// if any, without holding the detector lock while sleeping.
pub fn stress_delay_for(thread_id: ThreadId, lock_id: LockId) -> Option<Duration> {
    GLOBAL_DETECTOR.lock().stress_delay_for(thread_id, lock_id)
}

/// Sleeps for the configured stress delay, if any, just before the caller
/// blocks on the real primitive. A no-op once no delay is configured.
pub fn stress_sleep(thread_id: ThreadId, lock_id: LockId) {
    if let Some(delay) = stress_delay_for(thread_id, lock_id) {
        std::thread::sleep(delay);
    }
}

/// Yields the releasing thread right after a release, if `preempt_after_release`
/// is configured, to increase the chance a waiter observes the freed
/// resource first.
pub fn maybe_preempt_after_release() {
    let should_yield = GLOBAL_DETECTOR
        .lock()
        .stress_config
        .as_ref()
        .is_some_and(|c| c.preempt_after_release);
    if should_yield {
        std::thread::yield_now();
    }
}
