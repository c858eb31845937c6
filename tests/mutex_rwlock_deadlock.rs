use cyclewatch::{thread, Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{expect_deadlock, start_detector, DEADLOCK_TIMEOUT};

#[test]
fn test_mutex_rwlock_deadlock() {
    let harness = start_detector();

    let mutex = Arc::new(Mutex::new(()));
    let rwlock = Arc::new(RwLock::new(()));

    {
        let mutex = Arc::clone(&mutex);
        let rwlock = Arc::clone(&rwlock);
        thread::spawn(move || {
            let _g1 = mutex.lock();
            std::thread::sleep(Duration::from_millis(100));
            let _g2 = rwlock.write();
        });
    }

    {
        let mutex = Arc::clone(&mutex);
        let rwlock = Arc::clone(&rwlock);
        thread::spawn(move || {
            let _g1 = rwlock.write();
            std::thread::sleep(Duration::from_millis(100));
            let _g2 = mutex.lock();
        });
    }

    let info = expect_deadlock(&harness, DEADLOCK_TIMEOUT);
    assert_eq!(info.thread_cycle.len(), 2, "deadlock should involve exactly 2 threads");
    assert_eq!(info.thread_waiting_for_locks.len(), 2);
}
