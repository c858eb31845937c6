use cyclewatch::{thread, Condvar, Mutex};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

mod common;
use common::{expect_deadlock, start_detector, DEADLOCK_TIMEOUT};

#[test]
fn test_condvar_cycle_deadlock() {
    let harness = start_detector();

    let m_a = Arc::new(Mutex::new(false)); // protects `ready`
    let m_b = Arc::new(Mutex::new(()));
    let cv = Arc::new(Condvar::new());
    let ready = Arc::new(AtomicBool::new(false));

    // Thread 1: waits on cv holding A, then needs B.
    {
        let m_a = Arc::clone(&m_a);
        let m_b = Arc::clone(&m_b);
        let cv = Arc::clone(&cv);
        let ready = Arc::clone(&ready);
        thread::spawn(move || {
            let mut guard_a = m_a.lock();
            while !*guard_a {
                cv.wait(&mut guard_a);
            }
            let _guard_b = m_b.lock();
            ready.store(true, Ordering::SeqCst);
        });
    }

    // Thread 2: holds B, signals, then needs A again.
    {
        let m_a = Arc::clone(&m_a);
        let m_b = Arc::clone(&m_b);
        let cv = Arc::clone(&cv);
        thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));

            let _guard_b = m_b.lock();
            {
                let mut guard_a = m_a.lock();
                *guard_a = true;
                cv.notify_one();
            }

            std::thread::sleep(Duration::from_millis(10));
            let _guard_a2 = m_a.lock();
        });
    }

    let info = expect_deadlock(&harness, DEADLOCK_TIMEOUT);
    assert_eq!(info.thread_cycle.len(), 2);
}
