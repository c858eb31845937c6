use crate::core::detector::{process_deadlock, GLOBAL_DETECTOR};
use crate::core::error::{CoreError, CoreResult};
use crate::core::types::{next_resource_id, AccessMode, LockId, ThreadId};

pub fn create_rwlock(creator: Option<ThreadId>) -> LockId {
    let id = next_resource_id();
    let mut det = GLOBAL_DETECTOR.lock();
    det.registry.create_rwlock(id, creator);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_rwlock_create(id, creator);
    }
    id
}

pub fn destroy_rwlock(id: LockId) -> CoreResult<()> {
    let mut det = GLOBAL_DETECTOR.lock();
    match det.registry.destroy_rwlock(id) {
        None => Err(CoreError::InvalidHandle(id)),
        Some(true) => {
            if let Some(logger) = det.logger.as_mut() {
                logger.log_rwlock_destroy(id);
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

/// Writer-preference grant test: readers may proceed only if there is no
/// current writer and no writer already queued ahead of them.
fn read_grantable(det: &crate::core::detector::Detector, id: LockId) -> bool {
    det.registry
        .rwlocks
        .get(&id)
        .map(|r| r.writer.is_none() && !r.waiters.iter().any(|(_, m)| *m == AccessMode::Exclusive))
        .unwrap_or(false)
}

fn write_grantable(det: &crate::core::detector::Detector, id: LockId) -> bool {
    det.registry
        .rwlocks
        .get(&id)
        .map(|r| r.writer.is_none() && r.readers.is_empty())
        .unwrap_or(false)
}

pub fn read_lock_begin(tid: ThreadId, id: LockId) -> CoreResult<bool> {
    let mut det = GLOBAL_DETECTOR.lock();
    if det.registry.rwlocks.get(&id).is_none() {
        return Err(CoreError::InvalidHandle(id));
    }
    if read_grantable(&det, id) {
        let r = det.registry.rwlocks.get_mut(&id).unwrap();
        r.readers.insert(tid);
        det.registry.mark_held(tid, id);
        if let Some(logger) = det.logger.as_mut() {
            logger.log_rwlock_read_lock(tid, id);
        }
        return Ok(true);
    }

    let r = det.registry.rwlocks.get_mut(&id).unwrap();
    r.waiters.push_back((tid, AccessMode::Shared));
    // A blocked reader conflicts only with the writer holding up its grant
    // (current, or the earlier-queued writer enforcing writer-preference),
    // never with co-readers: shared-reader vs shared-reader is not a
    // conflict, so it must never become a wait edge.
    let blocker = r.writer.or_else(|| {
        r.waiters
            .iter()
            .find(|(_, mode)| *mode == AccessMode::Exclusive)
            .map(|(w, _)| *w)
    });
    if let (Some(logger), Some(holder)) = (det.logger.as_mut(), blocker) {
        logger.log_wait_edge(tid, holder);
    }
    let found = det.record_wait_and_detect_against(tid, id, blocker.into_iter().collect());
    let report = found.map(|c| det.build_report(c));
    drop(det);
    if let Some(info) = report {
        process_deadlock(info);
    }
    Ok(false)
}

pub fn read_lock_complete(tid: ThreadId, id: LockId) {
    let mut det = GLOBAL_DETECTOR.lock();
    det.clear_wait(tid);
    if let Some(r) = det.registry.rwlocks.get_mut(&id) {
        if let Some(pos) = r.waiters.iter().position(|(w, _)| *w == tid) {
            r.waiters.remove(pos);
        }
        r.readers.insert(tid);
    }
    det.registry.mark_held(tid, id);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_rwlock_read_lock(tid, id);
    }
}

pub fn read_unlock(tid: ThreadId, id: LockId) -> CoreResult<()> {
    let mut det = GLOBAL_DETECTOR.lock();
    let Some(r) = det.registry.rwlocks.get_mut(&id) else {
        return Err(CoreError::InvalidHandle(id));
    };
    if !r.readers.remove(&tid) {
        return Err(CoreError::NotHeldByCaller {
            thread: tid,
            resource: id,
        });
    }
    det.registry.mark_released(tid, id);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_rwlock_read_unlock(tid, id);
    }
    det.registry.reap_if_deferred(id);
    Ok(())
}

/// Write-lock acquisition also covers the read-to-write upgrade case: a
/// thread that already holds the read lock on `id` never competes against
/// itself, so `holds_read` only affects the grant test here. If another
/// reader holds `id` too, `record_wait_and_detect` below adds a wait edge
/// to that other reader exactly as it would for any other conflict, which
/// is what makes a concurrent upgrade on the same lock detectable.
pub fn write_lock_begin(tid: ThreadId, id: LockId) -> CoreResult<bool> {
    let mut det = GLOBAL_DETECTOR.lock();
    if det.registry.rwlocks.get(&id).is_none() {
        return Err(CoreError::InvalidHandle(id));
    }
    let holds_read = det
        .registry
        .rwlocks
        .get(&id)
        .map(|r| r.readers.contains(&tid))
        .unwrap_or(false);

    if !holds_read && write_grantable(&det, id) {
        let r = det.registry.rwlocks.get_mut(&id).unwrap();
        r.writer = Some(tid);
        det.registry.mark_held(tid, id);
        if let Some(logger) = det.logger.as_mut() {
            logger.log_rwlock_write_lock(tid, id);
        }
        return Ok(true);
    }

    det.registry
        .rwlocks
        .get_mut(&id)
        .unwrap()
        .waiters
        .push_back((tid, AccessMode::Exclusive));
    let conflicting = det.conflicting_holders(id);
    if let Some(logger) = det.logger.as_mut() {
        for &holder in &conflicting {
            if holder != tid {
                logger.log_wait_edge(tid, holder);
            }
        }
    }
    let found = det.record_wait_and_detect_against(tid, id, conflicting);
    let report = found.map(|c| det.build_report(c));
    drop(det);
    if let Some(info) = report {
        process_deadlock(info);
    }
    Ok(false)
}

pub fn write_lock_complete(tid: ThreadId, id: LockId) {
    let mut det = GLOBAL_DETECTOR.lock();
    det.clear_wait(tid);
    if let Some(r) = det.registry.rwlocks.get_mut(&id) {
        if let Some(pos) = r.waiters.iter().position(|(w, _)| *w == tid) {
            r.waiters.remove(pos);
        }
        r.readers.remove(&tid);
        r.writer = Some(tid);
    }
    det.registry.mark_held(tid, id);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_rwlock_write_lock(tid, id);
    }
}

pub fn write_unlock(tid: ThreadId, id: LockId) -> CoreResult<()> {
    let mut det = GLOBAL_DETECTOR.lock();
    let Some(r) = det.registry.rwlocks.get_mut(&id) else {
        return Err(CoreError::InvalidHandle(id));
    };
    if r.writer != Some(tid) {
        return Err(CoreError::NotHeldByCaller {
            thread: tid,
            resource: id,
        });
    }
    r.writer = None;
    det.registry.mark_released(tid, id);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_rwlock_write_unlock(tid, id);
    }
    det.registry.reap_if_deferred(id);
    Ok(())
}

pub fn creator_of(id: LockId) -> Option<ThreadId> {
    GLOBAL_DETECTOR
        .lock()
        .registry
        .rwlocks
        .get(&id)
        .and_then(|r| r.creator_thread_id)
}
