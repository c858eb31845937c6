use cyclewatch::{thread, RwLock};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{assert_no_deadlock, start_detector, NO_DEADLOCK_TIMEOUT};

#[test]
fn test_writer_waits_for_readers_no_deadlock() {
    let harness = start_detector();

    let lock = Arc::new(RwLock::new(42));
    let l1 = Arc::clone(&lock);
    let l2 = Arc::clone(&lock);

    let reader = thread::spawn(move || {
        let _g = l1.read();
        std::thread::sleep(Duration::from_millis(100));
    });

    std::thread::sleep(Duration::from_millis(10));

    let writer = thread::spawn(move || {
        let _g = l2.write();
    });

    reader.join().unwrap();
    writer.join().unwrap();

    assert_no_deadlock(&harness, NO_DEADLOCK_TIMEOUT);
}
