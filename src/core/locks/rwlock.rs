use std::fmt;
use std::ops::{Deref, DerefMut};

use parking_lot::{
    RwLock as InnerRwLock, RwLockReadGuard as InnerReadGuard, RwLockWriteGuard as InnerWriteGuard,
};

use crate::core::detector::rwlock as engine;
use crate::core::types::{current_thread_id, LockId, ThreadId};

/// A reader/writer lock instrumented for deadlock detection, with
/// writer-preference fairness delegated to `parking_lot::RwLock` so the
/// FIFO order the detector observes matches real wakeup order.
pub struct RwLock<T> {
    id: LockId,
    inner: InnerRwLock<T>,
    creator_thread_id: ThreadId,
}

pub struct RwLockReadGuard<'a, T> {
    thread_id: ThreadId,
    lock_id: LockId,
    guard: InnerReadGuard<'a, T>,
}

pub struct RwLockWriteGuard<'a, T> {
    thread_id: ThreadId,
    lock_id: LockId,
    guard: InnerWriteGuard<'a, T>,
}

impl<T> RwLock<T> {
    pub fn new(value: T) -> Self {
        Self::with_creator(value, Some(current_thread_id()))
    }

    /// Like `new`, but registers `creator` (rather than the calling thread)
    /// as the owner for cascaded-destruction purposes.
    pub fn with_creator(value: T, creator: Option<ThreadId>) -> Self {
        let id = engine::create_rwlock(creator);
        RwLock {
            id,
            inner: InnerRwLock::new(value),
            creator_thread_id: creator.unwrap_or_else(current_thread_id),
        }
    }

    pub fn id(&self) -> LockId {
        self.id
    }

    pub fn creator_thread_id(&self) -> ThreadId {
        self.creator_thread_id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        let tid = current_thread_id();
        #[cfg(feature = "stress-test")]
        crate::core::detector::stress::stress_sleep(tid, self.id);
        match engine::read_lock_begin(tid, self.id) {
            Ok(true) => RwLockReadGuard {
                thread_id: tid,
                lock_id: self.id,
                guard: self.inner.read(),
            },
            Ok(false) => {
                let guard = self.inner.read();
                engine::read_lock_complete(tid, self.id);
                RwLockReadGuard {
                    thread_id: tid,
                    lock_id: self.id,
                    guard,
                }
            }
            Err(e) => panic!("cyclewatch: {e}"),
        }
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        let tid = current_thread_id();
        #[cfg(feature = "stress-test")]
        crate::core::detector::stress::stress_sleep(tid, self.id);
        match engine::write_lock_begin(tid, self.id) {
            Ok(true) => RwLockWriteGuard {
                thread_id: tid,
                lock_id: self.id,
                guard: self.inner.write(),
            },
            Ok(false) => {
                let guard = self.inner.write();
                engine::write_lock_complete(tid, self.id);
                RwLockWriteGuard {
                    thread_id: tid,
                    lock_id: self.id,
                    guard,
                }
            }
            Err(e) => panic!("cyclewatch: {e}"),
        }
    }

    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, T>> {
        let tid = current_thread_id();
        let guard = self.inner.try_read()?;
        engine::read_lock_complete(tid, self.id);
        Some(RwLockReadGuard {
            thread_id: tid,
            lock_id: self.id,
            guard,
        })
    }

    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, T>> {
        let tid = current_thread_id();
        let guard = self.inner.try_write()?;
        engine::write_lock_complete(tid, self.id);
        Some(RwLockWriteGuard {
            thread_id: tid,
            lock_id: self.id,
            guard,
        })
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.inner.get_mut()
    }

    pub fn into_inner(self) -> T {
        let id = self.id;
        let value = self.inner.into_inner();
        let _ = engine::destroy_rwlock(id);
        value
    }
}

impl<T> Drop for RwLock<T> {
    fn drop(&mut self) {
        let _ = engine::destroy_rwlock(self.id);
    }
}

impl<T> Deref for RwLockReadGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> Drop for RwLockReadGuard<'_, T> {
    fn drop(&mut self) {
        let _ = engine::read_unlock(self.thread_id, self.lock_id);
        #[cfg(feature = "stress-test")]
        crate::core::detector::stress::maybe_preempt_after_release();
    }
}

impl<T> Deref for RwLockWriteGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for RwLockWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T> Drop for RwLockWriteGuard<'_, T> {
    fn drop(&mut self) {
        let _ = engine::write_unlock(self.thread_id, self.lock_id);
        #[cfg(feature = "stress-test")]
        crate::core::detector::stress::maybe_preempt_after_release();
    }
}

impl<T: fmt::Debug> fmt::Debug for RwLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RwLock").field("id", &self.id).finish()
    }
}
