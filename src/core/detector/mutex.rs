use crate::core::detector::{process_deadlock, GLOBAL_DETECTOR};
use crate::core::error::{CoreError, CoreResult};
use crate::core::types::{current_thread_id, next_resource_id, LockId, ThreadId};

/// Allocates a tracked mutex id and registers it with the registry.
pub fn create_mutex(creator: Option<ThreadId>) -> LockId {
    let id = next_resource_id();
    let mut det = GLOBAL_DETECTOR.lock();
    det.registry.create_mutex(id, creator);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_mutex_create(id, creator);
    }
    id
}

pub fn destroy_mutex(id: LockId) -> CoreResult<()> {
    let mut det = GLOBAL_DETECTOR.lock();
    match det.registry.destroy_mutex(id) {
        None => Err(CoreError::InvalidHandle(id)),
        Some(true) => {
            if let Some(logger) = det.logger.as_mut() {
                logger.log_mutex_destroy(id);
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

/// Called before the caller blocks on the real mutex. Grants immediately if
/// unheld; otherwise records a wait edge, runs the cycle detector, and
/// enqueues the caller so FIFO order can be reconstructed for the log.
///
/// Returns `Ok(true)` if the lock was granted with no blocking necessary.
pub fn lock_begin(tid: ThreadId, id: LockId) -> CoreResult<bool> {
    let mut det = GLOBAL_DETECTOR.lock();
    let blocked_on = {
        let Some(m) = det.registry.mutexes.get_mut(&id) else {
            return Err(CoreError::InvalidHandle(id));
        };
        if m.holder.is_none() {
            m.holder = Some(tid);
            None
        } else {
            m.waiters.push_back(tid);
            m.holder
        }
    };

    let Some(holder) = blocked_on else {
        det.registry.mark_held(tid, id);
        if let Some(logger) = det.logger.as_mut() {
            logger.log_mutex_lock(tid, id);
        }
        return Ok(true);
    };

    if let Some(logger) = det.logger.as_mut() {
        logger.log_wait_edge(tid, holder);
    }
    let found = det.record_wait_and_detect(tid, id);
    let report = found.map(|c| det.build_report(c));
    drop(det);
    if let Some(info) = report {
        process_deadlock(info);
    }
    Ok(false)
}

/// Called once the caller has actually acquired the real OS mutex after
/// blocking in `lock_begin`.
pub fn lock_complete(tid: ThreadId, id: LockId) {
    let mut det = GLOBAL_DETECTOR.lock();
    det.clear_wait(tid);
    if let Some(m) = det.registry.mutexes.get_mut(&id) {
        if let Some(pos) = m.waiters.iter().position(|&w| w == tid) {
            m.waiters.remove(pos);
        }
        m.holder = Some(tid);
    }
    det.registry.mark_held(tid, id);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_mutex_lock(tid, id);
    }
}

/// Registers that `tid` has just really reacquired `id` as the tail end of
/// a condvar wait. Unlike `lock_begin`, the real OS-level acquisition has
/// already happened atomically inside the condvar primitive by the time
/// this is called, so there is nothing left to grant or queue; this only
/// brings the registry's bookkeeping back in sync.
pub fn reacquire_after_wait(tid: ThreadId, id: LockId) {
    let mut det = GLOBAL_DETECTOR.lock();
    if let Some(m) = det.registry.mutexes.get_mut(&id) {
        m.holder = Some(tid);
    }
    det.registry.mark_held(tid, id);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_mutex_lock(tid, id);
    }
}

pub fn unlock(tid: ThreadId, id: LockId) -> CoreResult<()> {
    let mut det = GLOBAL_DETECTOR.lock();
    let Some(m) = det.registry.mutexes.get_mut(&id) else {
        return Err(CoreError::InvalidHandle(id));
    };
    if m.holder != Some(tid) {
        return Err(CoreError::NotHeldByCaller {
            thread: tid,
            resource: id,
        });
    }
    m.holder = None;
    det.registry.mark_released(tid, id);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_mutex_unlock(tid, id);
    }
    det.registry.reap_if_deferred(id);
    Ok(())
}

pub fn creator_of(id: LockId) -> Option<ThreadId> {
    GLOBAL_DETECTOR
        .lock()
        .registry
        .mutexes
        .get(&id)
        .and_then(|m| m.creator_thread_id)
}

pub fn current_thread() -> ThreadId {
    current_thread_id()
}
