//! Cyclewatch embeds a deadlock detector inside the synchronization
//! primitives an application uses. Every acquire, release, wait and signal
//! on [`Mutex`], [`RwLock`] and [`Condvar`] updates a global wait-for
//! graph; the moment that graph gains a cycle, the registered callback is
//! invoked with a JSON-serializable description of the offending threads
//! and resources.
//!
//! ```no_run
//! use cyclewatch::{Cyclewatch, Mutex, thread};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! Cyclewatch::new()
//!     .callback(|info| eprintln!("deadlock: {info:?}"))
//!     .start()
//!     .expect("detector already initialized");
//!
//! let a = Arc::new(Mutex::new(()));
//! let b = Arc::new(Mutex::new(()));
//!
//! let (a2, b2) = (a.clone(), b.clone());
//! thread::spawn(move || {
//!     let _g = a2.lock();
//!     std::thread::sleep(Duration::from_millis(100));
//!     let _g = b2.lock();
//! });
//!
//! let _g = b.lock();
//! std::thread::sleep(Duration::from_millis(100));
//! let _g = a.lock();
//! ```

mod core;
pub mod ffi;
pub mod showcase;

pub use crate::core::detector::{flush_logs, is_deadlock_detected, is_logging_enabled, reset_deadlock_flag};
pub use crate::core::error::CoreError;
pub use crate::core::locks::{Condvar, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use crate::core::thread;
pub use crate::core::types::{current_thread_id, CondvarId, DeadlockInfo, LockId, ThreadId};
pub use crate::core::Cyclewatch;

#[cfg(feature = "stress-test")]
pub use crate::core::stress::{StressConfig, StressMode};
