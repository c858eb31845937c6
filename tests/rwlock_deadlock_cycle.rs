use cyclewatch::{thread, RwLock};
use std::sync::{Arc, Barrier};

mod common;
use common::{expect_deadlock, start_detector, DEADLOCK_TIMEOUT};

#[test]
fn test_three_thread_rwlock_deadlock() {
    let harness = start_detector();

    let locks = [
        Arc::new(RwLock::new(0)),
        Arc::new(RwLock::new(0)),
        Arc::new(RwLock::new(0)),
    ];
    let barrier = Arc::new(Barrier::new(3));

    for i in 0..3 {
        let locks = locks.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            let _ri = locks[i].read();
            barrier.wait();
            let _wi_next = locks[(i + 1) % 3].write();
        });
    }

    let info = expect_deadlock(&harness, DEADLOCK_TIMEOUT);
    assert_eq!(info.thread_cycle.len(), 3, "deadlock should involve 3 threads");
}
