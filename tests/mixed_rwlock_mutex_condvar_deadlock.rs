use cyclewatch::{thread, Condvar, Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{expect_deadlock, start_detector, DEADLOCK_TIMEOUT};

#[test]
fn test_mixed_rwlock_mutex_condvar_deadlock() {
    let harness = start_detector();

    let shared_data = Arc::new(RwLock::new(vec![1, 2, 3, 4, 5]));
    let processor_mutex = Arc::new(Mutex::new(String::from("idle")));
    let data_ready_cv = Arc::new(Condvar::new());

    // Reader: reads data, waits for processing, then needs processor access again.
    {
        let shared_data = Arc::clone(&shared_data);
        let processor_mutex = Arc::clone(&processor_mutex);
        let data_ready_cv = Arc::clone(&data_ready_cv);
        thread::spawn(move || {
            let _data_guard = shared_data.read();

            let mut processor_state = processor_mutex.lock();
            while *processor_state == "idle" {
                data_ready_cv.wait(&mut processor_state);
            }
            drop(processor_state);

            let _final_processor_access = processor_mutex.lock();
        });
    }

    // Writer: sets processing state, signals, then needs data write access.
    {
        let shared_data = Arc::clone(&shared_data);
        let processor_mutex = Arc::clone(&processor_mutex);
        let data_ready_cv = Arc::clone(&data_ready_cv);
        thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));

            let mut processor_state = processor_mutex.lock();
            *processor_state = String::from("processing");
            data_ready_cv.notify_one();

            std::thread::sleep(Duration::from_millis(20));

            let _data_write_guard = shared_data.write();
            let _ = &mut processor_state;
        });
    }

    let info = expect_deadlock(&harness, DEADLOCK_TIMEOUT);
    assert_eq!(info.thread_cycle.len(), 2);
}
