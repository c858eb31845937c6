use cyclewatch::{thread, RwLock};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{assert_no_deadlock, start_detector, NO_DEADLOCK_TIMEOUT};

/// A reader blocked purely by writer-preference (a writer is already
/// queued ahead of it) must never be edged against co-readers: that
/// would be a shared-reader -> shared-reader edge, which never
/// represents a real conflict and must never appear in the graph.
#[test]
fn test_reader_blocked_by_queued_writer_no_false_cycle() {
    let harness = start_detector();

    let lock = Arc::new(RwLock::new(0));

    // T0 takes the read lock and holds it for a while.
    let l0 = Arc::clone(&lock);
    let t0 = thread::spawn(move || {
        let _r = l0.read();
        std::thread::sleep(Duration::from_millis(150));
    });

    std::thread::sleep(Duration::from_millis(20));

    // T1 queues for write, blocked behind T0's read.
    let l1 = Arc::clone(&lock);
    let t1 = thread::spawn(move || {
        let _w = l1.write();
        std::thread::sleep(Duration::from_millis(50));
    });

    std::thread::sleep(Duration::from_millis(20));

    // T2 requests read while T1 is queued ahead of it: writer-preference
    // blocks T2, but T2 and T0 never conflict with each other.
    let l2 = Arc::clone(&lock);
    let t2 = thread::spawn(move || {
        let _r = l2.read();
    });

    t0.join().unwrap();
    t1.join().unwrap();
    t2.join().unwrap();

    assert_no_deadlock(&harness, NO_DEADLOCK_TIMEOUT);
}
