use cyclewatch::{thread, Mutex};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{expect_deadlock, start_detector, DEADLOCK_TIMEOUT};

#[test]
fn test_two_thread_ab_ba_deadlock() {
    let harness = start_detector();

    let a = Arc::new(Mutex::new(()));
    let b = Arc::new(Mutex::new(()));

    {
        let a = Arc::clone(&a);
        let b = Arc::clone(&b);
        thread::spawn(move || {
            let _ga = a.lock();
            std::thread::sleep(Duration::from_millis(50));
            let _gb = b.lock();
        });
    }

    {
        let a = Arc::clone(&a);
        let b = Arc::clone(&b);
        thread::spawn(move || {
            let _gb = b.lock();
            std::thread::sleep(Duration::from_millis(50));
            let _ga = a.lock();
        });
    }

    let info = expect_deadlock(&harness, DEADLOCK_TIMEOUT);
    assert_eq!(info.thread_cycle.len(), 2, "deadlock should involve 2 threads");
    assert_eq!(info.thread_waiting_for_locks.len(), 2);
}
