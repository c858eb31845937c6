use cyclewatch::{thread, Mutex};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{expect_deadlock, start_detector, DEADLOCK_TIMEOUT};

#[test]
fn test_five_lock_cycle_deadlock() {
    let harness = start_detector();

    let a = Arc::new(Mutex::new(()));
    let b = Arc::new(Mutex::new(()));
    let c = Arc::new(Mutex::new(()));
    let d = Arc::new(Mutex::new(()));
    let e = Arc::new(Mutex::new(()));

    let chains: Vec<Vec<Arc<Mutex<()>>>> = vec![
        vec![a.clone(), b.clone(), c.clone(), d.clone(), e.clone()],
        vec![b.clone(), c.clone(), d.clone(), e.clone(), a.clone()],
        vec![c.clone(), d.clone(), e.clone(), a.clone(), b.clone()],
        vec![d.clone(), e.clone(), a.clone(), b.clone(), c.clone()],
        vec![e.clone(), a.clone(), b.clone(), c.clone(), d.clone()],
    ];

    for (i, chain) in chains.into_iter().enumerate() {
        thread::spawn(move || {
            std::thread::sleep(Duration::from_micros(100 * i as u64));
            let _g0 = chain[0].lock();
            std::thread::sleep(Duration::from_millis(50));
            let _g1 = chain[1].lock();
            std::thread::sleep(Duration::from_millis(50));
            let _g2 = chain[2].lock();
            std::thread::sleep(Duration::from_millis(50));
            let _g3 = chain[3].lock();
            std::thread::sleep(Duration::from_millis(50));
            let _g4 = chain[4].lock();
        });
    }

    let info = expect_deadlock(&harness, DEADLOCK_TIMEOUT);
    assert_eq!(info.thread_cycle.len(), 5, "deadlock should involve all 5 threads");
    assert!(!info.thread_waiting_for_locks.is_empty());
}
