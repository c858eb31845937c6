//! Drop-in replacement for `std::thread` that registers spawn/exit events
//! with the detector so the wait-for graph always has a node for every
//! live tracked thread, and so cascaded resource destruction (§4.B) can
//! run when a thread exits.

pub use std::thread::{
    available_parallelism, current, panicking, park, park_timeout, sleep, yield_now, AccessError,
    LocalKey, Result, Thread,
};

use crate::core::detector::thread as engine;
use crate::core::types::current_thread_id;

/// Spawns a thread tracked by the detector: registers a spawn event before
/// running the closure and an exit event (triggering cascaded destruction)
/// after it returns, even if it panics.
pub fn spawn<F, T>(f: F) -> std::thread::JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Builder::new().spawn(f).expect("failed to spawn thread")
}

/// Builder mirroring `std::thread::Builder`, registering the same
/// spawn/exit bookkeeping as `spawn`.
pub struct Builder {
    inner: std::thread::Builder,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            inner: std::thread::Builder::new(),
        }
    }

    pub fn name(mut self, name: String) -> Self {
        self.inner = self.inner.name(name);
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.inner = self.inner.stack_size(size);
        self
    }

    pub fn spawn<F, T>(self, f: F) -> std::io::Result<std::thread::JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let parent_id = current_thread_id();
        self.inner.spawn(move || {
            let tid = current_thread_id();
            engine::on_thread_spawn(tid, Some(parent_id));
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
            engine::on_thread_exit(tid);
            match result {
                Ok(value) => value,
                Err(payload) => std::panic::resume_unwind(payload),
            }
        })
    }
}
