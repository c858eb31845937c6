use cyclewatch::{thread, Mutex};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{expect_deadlock, start_detector, DEADLOCK_TIMEOUT};

#[test]
fn test_dining_philosophers_deadlock() {
    let harness = start_detector();

    let num_philosophers = 5;
    let forks: Vec<Arc<Mutex<String>>> = (0..num_philosophers)
        .map(|i| Arc::new(Mutex::new(format!("fork {i}"))))
        .collect();

    for i in 0..num_philosophers {
        let left_fork = Arc::clone(&forks[i]);
        let right_fork = Arc::clone(&forks[(i + 1) % num_philosophers]);
        thread::spawn(move || {
            let _left = left_fork.lock();
            std::thread::sleep(Duration::from_millis(100));
            let _right = right_fork.lock();
            std::thread::sleep(Duration::from_millis(500));
        });
    }

    let info = expect_deadlock(&harness, DEADLOCK_TIMEOUT);
    assert!(
        info.thread_cycle.len() >= 2,
        "deadlock should involve at least 2 threads"
    );
    assert!(
        !info.thread_waiting_for_locks.is_empty(),
        "there should be thread-lock waiting relationships"
    );
}
