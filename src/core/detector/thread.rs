use crate::core::detector::GLOBAL_DETECTOR;
use crate::core::types::ThreadId;

pub fn on_thread_spawn(tid: ThreadId, parent_id: Option<ThreadId>) {
    let mut det = GLOBAL_DETECTOR.lock();
    det.registry.register_thread_spawn(tid, parent_id);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_thread_spawn(tid, parent_id);
    }
}

/// Marks the thread dead and cascades destruction of any resource it
/// created that has since fallen idle (§4.B). Also drops the thread's node
/// from the wait-for graph; a dead thread can neither wait nor be waited
/// on.
pub fn on_thread_exit(tid: ThreadId) {
    let mut det = GLOBAL_DETECTOR.lock();
    let deferred = det.registry.register_thread_exit(tid);
    det.wait_for_graph.remove_thread(tid);
    det.thread_waits_for.remove(&tid);
    if let Some(logger) = det.logger.as_mut() {
        logger.log_thread_exit(tid);
        for id in deferred {
            logger.log_destroy_deferred(id);
        }
    }
}
