use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::{Mutex as InnerMutex, MutexGuard as InnerGuard};

use crate::core::detector::mutex as engine;
use crate::core::error::CoreResult;
use crate::core::types::{current_thread_id, LockId, ThreadId};

/// A mutex instrumented for deadlock detection. Every `lock()` records a
/// wait edge before blocking on the real `parking_lot::Mutex` and clears it
/// once the lock is actually held, so a truly-blocked thread is always
/// visible to the detector between those two points.
pub struct Mutex<T> {
    id: LockId,
    inner: InnerMutex<T>,
    creator_thread_id: ThreadId,
}

pub struct MutexGuard<'a, T> {
    thread_id: ThreadId,
    lock_id: LockId,
    guard: Option<InnerGuard<'a, T>>,
}

impl<T> Mutex<T> {
    pub fn new(value: T) -> Self {
        Self::with_creator(value, Some(current_thread_id()))
    }

    /// Like `new`, but registers `creator` (rather than the calling thread)
    /// as the owner for cascaded-destruction purposes. Used by the FFI
    /// layer, where the calling thread is often just a C shim.
    pub fn with_creator(value: T, creator: Option<ThreadId>) -> Self {
        let id = engine::create_mutex(creator);
        Mutex {
            id,
            inner: InnerMutex::new(value),
            creator_thread_id: creator.unwrap_or_else(current_thread_id),
        }
    }

    pub fn id(&self) -> LockId {
        self.id
    }

    pub fn creator_thread_id(&self) -> ThreadId {
        self.creator_thread_id
    }

    pub fn lock(&self) -> MutexGuard<'_, T> {
        let tid = current_thread_id();
        #[cfg(feature = "stress-test")]
        crate::core::detector::stress::stress_sleep(tid, self.id);
        match engine::lock_begin(tid, self.id) {
            Ok(true) => MutexGuard {
                thread_id: tid,
                lock_id: self.id,
                guard: Some(self.inner.lock()),
            },
            Ok(false) => {
                let guard = self.inner.lock();
                engine::lock_complete(tid, self.id);
                MutexGuard {
                    thread_id: tid,
                    lock_id: self.id,
                    guard: Some(guard),
                }
            }
            Err(e) => panic!("cyclewatch: {e}"),
        }
    }

    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        let tid = current_thread_id();
        let guard = self.inner.try_lock()?;
        // A non-blocking success is reported the same way an uncontended
        // lock_begin would be: grant with no wait edge ever recorded.
        engine::lock_complete(tid, self.id);
        Some(MutexGuard {
            thread_id: tid,
            lock_id: self.id,
            guard: Some(guard),
        })
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    pub fn into_inner(self) -> T {
        let id = self.id;
        let value = self.inner.into_inner();
        let _ = engine::destroy_mutex(id);
        value
    }
}

impl<T> Drop for Mutex<T> {
    fn drop(&mut self) {
        let _ = engine::destroy_mutex(self.id);
    }
}

impl<'a, T> MutexGuard<'a, T> {
    pub(crate) fn inner_guard_mut(&mut self) -> &mut InnerGuard<'a, T> {
        self.guard.as_mut().expect("guard already consumed by condvar wait")
    }

    pub(crate) fn take_inner(&mut self) -> InnerGuard<'a, T> {
        self.guard.take().expect("guard already consumed by condvar wait")
    }

    pub(crate) fn restore_inner(&mut self, guard: InnerGuard<'a, T>) {
        self.guard = Some(guard);
    }

    pub(crate) fn lock_id(&self) -> LockId {
        self.lock_id
    }

    pub(crate) fn thread_id(&self) -> ThreadId {
        self.thread_id
    }
}

impl<T> Deref for MutexGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.guard.as_ref().expect("guard already consumed by condvar wait")
    }
}

impl<T> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.guard.as_mut().expect("guard already consumed by condvar wait")
    }
}

impl<T> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        if self.guard.is_some() {
            let _ = engine::unlock(self.thread_id, self.lock_id);
            #[cfg(feature = "stress-test")]
            crate::core::detector::stress::maybe_preempt_after_release();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Mutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutex").field("id", &self.id).finish()
    }
}

pub type LockResult<T> = CoreResult<T>;
