use cyclewatch::{thread, Condvar, Mutex};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

mod common;
use common::{assert_no_deadlock, start_detector, NO_DEADLOCK_TIMEOUT};

#[test]
fn test_condvar_spurious_wakeup_no_deadlock() {
    let harness = start_detector();

    let m = Arc::new(Mutex::new(false));
    let cv = Arc::new(Condvar::new());
    let notify_count = Arc::new(AtomicUsize::new(0));

    {
        let m = Arc::clone(&m);
        let cv = Arc::clone(&cv);
        let notify_count = Arc::clone(&notify_count);
        thread::spawn(move || {
            let mut g = m.lock();
            while !*g {
                cv.wait(&mut g);
            }
            notify_count.fetch_add(1, Ordering::SeqCst);
        });
    }

    for _ in 0..3 {
        cv.notify_one();
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    {
        let mut g = m.lock();
        *g = true;
    }
    cv.notify_one();

    assert_no_deadlock(&harness, NO_DEADLOCK_TIMEOUT);
}
