use crate::core::detector::{mutex, GLOBAL_DETECTOR};
use crate::core::error::{CoreError, CoreResult};
use crate::core::types::{next_resource_id, CondvarId, LockId, ThreadId};

pub fn create_condvar(creator: Option<ThreadId>) -> CondvarId {
    let id = next_resource_id();
    let mut det = GLOBAL_DETECTOR.lock();
    det.registry.create_condvar(id, creator);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_condvar_create(id, creator);
    }
    id
}

pub fn destroy_condvar(id: CondvarId) -> CoreResult<()> {
    let mut det = GLOBAL_DETECTOR.lock();
    match det.registry.destroy_condvar(id) {
        None => Err(CoreError::InvalidHandle(id)),
        Some(true) => {
            if let Some(logger) = det.logger.as_mut() {
                logger.log_condvar_destroy(id);
            }
            Ok(())
        }
        Some(false) => {
            if let Some(logger) = det.logger.as_mut() {
                logger.log_destroy_deferred(id);
            }
            Ok(())
        }
    }
}

/// Atomic release side of release-wait-reacquire: validates ownership,
/// releases the mutex hold, and parks the thread in the condvar's waiter
/// queue with a wait edge pointing at the condvar. Must be called
/// immediately before the caller actually blocks on the OS condvar.
pub fn begin_wait(tid: ThreadId, cv_id: CondvarId, mutex_id: LockId) -> CoreResult<()> {
    let mut det = GLOBAL_DETECTOR.lock();
    {
        let Some(m) = det.registry.mutexes.get(&mutex_id) else {
            return Err(CoreError::InvalidHandle(mutex_id));
        };
        if m.holder != Some(tid) {
            return Err(CoreError::NotHeldByCaller {
                thread: tid,
                resource: mutex_id,
            });
        }
    }
    if det.registry.condvars.get(&cv_id).is_none() {
        return Err(CoreError::InvalidHandle(cv_id));
    }

    // Release the mutex: this is the atomic part of wait() as seen by the
    // detector, the real OS condvar performs the matching release itself.
    det.registry.mutexes.get_mut(&mutex_id).unwrap().holder = None;
    det.registry.mark_released(tid, mutex_id);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_mutex_unlock(tid, mutex_id);
    }
    det.registry.reap_if_deferred(mutex_id);

    det.registry
        .condvars
        .get_mut(&cv_id)
        .unwrap()
        .waiters
        .push_back((tid, mutex_id));
    det.thread_waits_for.insert(tid, cv_id);
    // No graph wait edge here: the mutex was just released above, so there
    // is no holder to point at yet (mirrors `conflicting_holders` returning
    // nothing for a condvar). The real dependency, if any, only appears
    // once the thread reacquires the mutex after waking.
    if let Some(logger) = det.logger.as_mut() {
        logger.log_condvar_wait(tid, cv_id, mutex_id);
    }
    Ok(())
}

/// Clears the condvar-side wait edge once the thread has woken (signalled,
/// broadcast, spurious, or timed out) and is about to reacquire its mutex.
pub fn end_wait(tid: ThreadId, cv_id: CondvarId) {
    let mut det = GLOBAL_DETECTOR.lock();
    det.thread_waits_for.remove(&tid);
    if let Some(c) = det.registry.condvars.get_mut(&cv_id) {
        if let Some(pos) = c.waiters.iter().position(|(w, _)| *w == tid) {
            c.waiters.remove(pos);
        }
    }
    if let Some(logger) = det.logger.as_mut() {
        logger.log_condvar_wait_end(tid, cv_id);
    }
    det.registry.reap_if_deferred(cv_id);
}

/// Wakes the longest-waiting thread (FIFO by insertion order, §9 open
/// question resolution). A no-op if nobody is waiting.
pub fn notify_one(cv_id: CondvarId) -> CoreResult<()> {
    let mut det = GLOBAL_DETECTOR.lock();
    if det.registry.condvars.get(&cv_id).is_none() {
        return Err(CoreError::InvalidHandle(cv_id));
    }
    if let Some(logger) = det.logger.as_mut() {
        logger.log_condvar_notify_one(cv_id);
    }
    Ok(())
}

pub fn notify_all(cv_id: CondvarId) -> CoreResult<()> {
    let mut det = GLOBAL_DETECTOR.lock();
    if det.registry.condvars.get(&cv_id).is_none() {
        return Err(CoreError::InvalidHandle(cv_id));
    }
    if let Some(logger) = det.logger.as_mut() {
        logger.log_condvar_notify_all(cv_id);
    }
    Ok(())
}

pub fn creator_of(id: CondvarId) -> Option<ThreadId> {
    GLOBAL_DETECTOR
        .lock()
        .registry
        .condvars
        .get(&id)
        .and_then(|c| c.creator_thread_id)
}

pub use mutex::reacquire_after_wait;
