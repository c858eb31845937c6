use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identifier for a tracked thread.
pub type ThreadId = u64;
/// Process-unique identifier for a tracked mutex or rwlock.
pub type LockId = u64;
/// Process-unique identifier for a tracked condvar.
pub type CondvarId = u64;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates the next process-unique thread id.
///
/// Thread ids and resource ids are drawn from disjoint counters; nothing
/// requires the two spaces to be comparable.
pub fn next_thread_id() -> ThreadId {
    NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed)
}

/// Allocates the next process-unique resource id (mutex, rwlock or condvar).
pub fn next_resource_id() -> LockId {
    NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Returns the id of the calling thread, registering one on first use.
///
/// Each OS thread gets exactly one id for its lifetime, cached in a
/// thread-local so repeated calls are cheap.
pub fn current_thread_id() -> ThreadId {
    thread_local! {
        static TID: ThreadId = next_thread_id();
    }
    TID.with(|t| *t)
}

/// Which conflicting mode a wait or hold edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Shared,
    Exclusive,
}

/// Bit-exact JSON payload delivered to the user callback and appended to the
/// log when a cycle is detected. No field beyond these three is ever added.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeadlockInfo {
    pub thread_cycle: Vec<ThreadId>,
    pub thread_waiting_for_locks: Vec<(ThreadId, LockId)>,
    pub timestamp: String,
}

/// Structured events appended to the event sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LogEvent {
    ThreadSpawn {
        thread_id: ThreadId,
        parent_id: Option<ThreadId>,
    },
    ThreadExit {
        thread_id: ThreadId,
    },
    MutexCreate {
        lock_id: LockId,
        creator_id: Option<ThreadId>,
    },
    MutexDestroy {
        lock_id: LockId,
    },
    MutexLock {
        thread_id: ThreadId,
        lock_id: LockId,
    },
    MutexUnlock {
        thread_id: ThreadId,
        lock_id: LockId,
    },
    RwLockCreate {
        lock_id: LockId,
        creator_id: Option<ThreadId>,
    },
    RwLockDestroy {
        lock_id: LockId,
    },
    RwLockReadLock {
        thread_id: ThreadId,
        lock_id: LockId,
    },
    RwLockReadUnlock {
        thread_id: ThreadId,
        lock_id: LockId,
    },
    RwLockWriteLock {
        thread_id: ThreadId,
        lock_id: LockId,
    },
    RwLockWriteUnlock {
        thread_id: ThreadId,
        lock_id: LockId,
    },
    CondvarCreate {
        condvar_id: CondvarId,
        creator_id: Option<ThreadId>,
    },
    CondvarDestroy {
        condvar_id: CondvarId,
    },
    CondvarWait {
        thread_id: ThreadId,
        condvar_id: CondvarId,
        mutex_id: LockId,
    },
    CondvarWaitEnd {
        thread_id: ThreadId,
        condvar_id: CondvarId,
    },
    CondvarNotifyOne {
        condvar_id: CondvarId,
    },
    CondvarNotifyAll {
        condvar_id: CondvarId,
    },
    DestroyDeferred {
        resource_id: LockId,
    },
    Deadlock {
        info: DeadlockInfo,
    },
}
