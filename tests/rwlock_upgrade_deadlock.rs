use cyclewatch::{thread, RwLock};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

mod common;
use common::{expect_deadlock, start_detector, DEADLOCK_TIMEOUT};

#[test]
fn test_rwlock_upgrade_deadlock() {
    let harness = start_detector();

    let lock = Arc::new(RwLock::new(0));
    let ready_count = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let lock = Arc::clone(&lock);
        let ready = Arc::clone(&ready_count);
        thread::spawn(move || {
            let _r = lock.read();
            ready.fetch_add(1, Ordering::SeqCst);
            while ready.load(Ordering::SeqCst) < 2 {
                std::thread::yield_now();
            }
            let _w = lock.write();
        });
    }

    let info = expect_deadlock(&harness, DEADLOCK_TIMEOUT);
    assert_eq!(info.thread_cycle.len(), 2, "deadlock should involve 2 threads");
    assert_eq!(info.thread_waiting_for_locks.len(), 2);
}
