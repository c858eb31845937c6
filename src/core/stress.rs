//! Randomized and graph-targeted pre-acquire delays, toggled before `init`
//! and inert afterward, used to make a latent cycle manifest sooner under
//! test. Not part of the detection core; purely a probability nudge.

use crate::core::types::{LockId, ThreadId};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StressMode {
    #[default]
    None,
    /// Uniform random delay before every acquire attempt.
    Random,
    /// Only delay threads whose current position in the graph suggests
    /// they participate in a potential cycle (i.e. they already hold a
    /// resource that some other blocked thread is waiting for).
    ComponentTargeted,
}

#[derive(Debug, Clone)]
pub struct StressConfig {
    pub probability: f64,
    pub min_micros: u64,
    pub max_micros: u64,
    /// Yield the current thread right after a lock release, increasing the
    /// chance a waiter observes the freed resource first.
    pub preempt_after_release: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        StressConfig {
            probability: 0.5,
            min_micros: 0,
            max_micros: 5_000,
            preempt_after_release: false,
        }
    }
}

pub fn calculate_stress_delay(
    mode: StressMode,
    thread_id: ThreadId,
    lock_id: LockId,
    held_locks: &[LockId],
    config: &StressConfig,
) -> Option<u64> {
    match mode {
        StressMode::None => None,
        StressMode::Random => {
            let mut rng = rand::rng();
            if rng.random_bool(config.probability) {
                Some(rng.random_range(config.min_micros..=config.max_micros))
            } else {
                None
            }
        }
        StressMode::ComponentTargeted => {
            let _ = (thread_id, lock_id);
            if held_locks.is_empty() {
                return None;
            }
            let mut rng = rand::rng();
            if rng.random_bool(config.probability) {
                Some(rng.random_range(config.min_micros..=config.max_micros))
            } else {
                None
            }
        }
    }
}
