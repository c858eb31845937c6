use fxhash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

use crate::core::types::{AccessMode, CondvarId, LockId, ThreadId};

/// A tracked OS thread.
pub struct ThreadInfo {
    pub id: ThreadId,
    pub parent_id: Option<ThreadId>,
    /// Resources currently held by this thread, of any kind.
    pub holds: FxHashSet<u64>,
    /// Resources created by this thread, tracked so they can be cascaded
    /// away on exit.
    pub created: FxHashSet<u64>,
    pub alive: bool,
}

pub struct MutexInfo {
    pub id: LockId,
    pub creator_thread_id: Option<ThreadId>,
    pub holder: Option<ThreadId>,
    pub waiters: VecDeque<ThreadId>,
    pub destroyed: bool,
}

pub struct RwLockInfo {
    pub id: LockId,
    pub creator_thread_id: Option<ThreadId>,
    pub readers: FxHashSet<ThreadId>,
    pub writer: Option<ThreadId>,
    pub waiters: VecDeque<(ThreadId, AccessMode)>,
    pub destroyed: bool,
}

pub struct CondvarInfo {
    pub id: CondvarId,
    pub creator_thread_id: Option<ThreadId>,
    /// Threads currently parked on this condvar, each with the mutex id
    /// they released to wait and will reacquire on wakeup, in wait order.
    pub waiters: VecDeque<(ThreadId, LockId)>,
    pub destroyed: bool,
}

impl MutexInfo {
    fn in_use(&self) -> bool {
        self.holder.is_some() || !self.waiters.is_empty()
    }
}

impl RwLockInfo {
    fn in_use(&self) -> bool {
        !self.readers.is_empty() || self.writer.is_some() || !self.waiters.is_empty()
    }
}

impl CondvarInfo {
    fn in_use(&self) -> bool {
        !self.waiters.is_empty()
    }
}

/// Owns the lifecycles of every tracked thread and resource: creation,
/// creator bookkeeping, and cascaded destruction on thread exit.
#[derive(Default)]
pub struct Registry {
    pub threads: FxHashMap<ThreadId, ThreadInfo>,
    pub mutexes: FxHashMap<LockId, MutexInfo>,
    pub rwlocks: FxHashMap<LockId, RwLockInfo>,
    pub condvars: FxHashMap<CondvarId, CondvarInfo>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_thread_spawn(&mut self, tid: ThreadId, parent_id: Option<ThreadId>) {
        self.threads.entry(tid).or_insert_with(|| ThreadInfo {
            id: tid,
            parent_id,
            holds: FxHashSet::default(),
            created: FxHashSet::default(),
            alive: true,
        });
    }

    /// Marks a thread dead and cascades destruction of every resource it
    /// created that has since fallen idle. Returns the ids of resources
    /// whose destruction had to be deferred because they are still in use.
    pub fn register_thread_exit(&mut self, tid: ThreadId) -> Vec<u64> {
        let Some(info) = self.threads.get_mut(&tid) else {
            return Vec::new();
        };
        info.alive = false;
        let created: Vec<u64> = info.created.iter().copied().collect();

        let mut deferred = Vec::new();
        for id in created {
            if let Some(m) = self.mutexes.get_mut(&id) {
                if m.in_use() {
                    m.destroyed = true;
                    deferred.push(id);
                } else {
                    self.mutexes.remove(&id);
                }
            } else if let Some(r) = self.rwlocks.get_mut(&id) {
                if r.in_use() {
                    r.destroyed = true;
                    deferred.push(id);
                } else {
                    self.rwlocks.remove(&id);
                }
            } else if let Some(c) = self.condvars.get_mut(&id) {
                if c.in_use() {
                    c.destroyed = true;
                    deferred.push(id);
                } else {
                    self.condvars.remove(&id);
                }
            }
        }
        deferred
    }

    pub fn create_mutex(&mut self, id: LockId, creator: Option<ThreadId>) {
        self.mutexes.insert(
            id,
            MutexInfo {
                id,
                creator_thread_id: creator,
                holder: None,
                waiters: VecDeque::new(),
                destroyed: false,
            },
        );
        self.note_created(creator, id);
    }

    pub fn create_rwlock(&mut self, id: LockId, creator: Option<ThreadId>) {
        self.rwlocks.insert(
            id,
            RwLockInfo {
                id,
                creator_thread_id: creator,
                readers: FxHashSet::default(),
                writer: None,
                waiters: VecDeque::new(),
                destroyed: false,
            },
        );
        self.note_created(creator, id);
    }

    pub fn create_condvar(&mut self, id: CondvarId, creator: Option<ThreadId>) {
        self.condvars.insert(
            id,
            CondvarInfo {
                id,
                creator_thread_id: creator,
                waiters: VecDeque::new(),
                destroyed: false,
            },
        );
        self.note_created(creator, id);
    }

    fn note_created(&mut self, creator: Option<ThreadId>, id: u64) {
        if let Some(tid) = creator {
            if let Some(info) = self.threads.get_mut(&tid) {
                info.created.insert(id);
            }
        }
    }

    /// Returns `true` if destruction completed immediately, `false` if it
    /// was deferred because the resource is still in use.
    pub fn destroy_mutex(&mut self, id: LockId) -> Option<bool> {
        let m = self.mutexes.get_mut(&id)?;
        if m.in_use() {
            m.destroyed = true;
            Some(false)
        } else {
            self.mutexes.remove(&id);
            Some(true)
        }
    }

    pub fn destroy_rwlock(&mut self, id: LockId) -> Option<bool> {
        let r = self.rwlocks.get_mut(&id)?;
        if r.in_use() {
            r.destroyed = true;
            Some(false)
        } else {
            self.rwlocks.remove(&id);
            Some(true)
        }
    }

    pub fn destroy_condvar(&mut self, id: CondvarId) -> Option<bool> {
        let c = self.condvars.get_mut(&id)?;
        if c.in_use() {
            c.destroyed = true;
            Some(false)
        } else {
            self.condvars.remove(&id);
            Some(true)
        }
    }

    /// Releases a resource that was flagged `destroyed` while still in use,
    /// once its last user has let go. Removes it if it has indeed fallen
    /// idle and was marked for deferred destruction.
    pub fn reap_if_deferred(&mut self, id: u64) {
        if let Some(m) = self.mutexes.get(&id) {
            if m.destroyed && !m.in_use() {
                self.mutexes.remove(&id);
            }
        }
        if let Some(r) = self.rwlocks.get(&id) {
            if r.destroyed && !r.in_use() {
                self.rwlocks.remove(&id);
            }
        }
        if let Some(c) = self.condvars.get(&id) {
            if c.destroyed && !c.in_use() {
                self.condvars.remove(&id);
            }
        }
    }

    pub fn mark_held(&mut self, tid: ThreadId, resource_id: u64) {
        if let Some(info) = self.threads.get_mut(&tid) {
            info.holds.insert(resource_id);
        }
    }

    pub fn mark_released(&mut self, tid: ThreadId, resource_id: u64) {
        if let Some(info) = self.threads.get_mut(&tid) {
            info.holds.remove(&resource_id);
        }
    }
}
