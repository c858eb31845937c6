use cyclewatch::{thread, Condvar, Mutex};
use std::sync::{Arc, Barrier};
use std::time::Duration;

mod common;
use common::{expect_deadlock, start_detector, DEADLOCK_TIMEOUT};

#[test]
fn test_producer_consumer_deadlock() {
    let harness = start_detector();

    let buffer_mutex = Arc::new(Mutex::new(Vec::<i32>::new()));
    let consumer_mutex = Arc::new(Mutex::new(()));
    let producer_cv = Arc::new(Condvar::new());
    let barrier = Arc::new(Barrier::new(3)); // main + producer + consumer

    // Producer: holds buffer, waits for space, then needs consumer resource.
    {
        let buffer_mutex = Arc::clone(&buffer_mutex);
        let consumer_mutex = Arc::clone(&consumer_mutex);
        let producer_cv = Arc::clone(&producer_cv);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();

            let mut buffer = buffer_mutex.lock();
            for i in 0..5 {
                buffer.push(i);
            }

            while buffer.len() >= 5 {
                producer_cv.wait(&mut buffer);
            }

            let _consumer_resource = consumer_mutex.lock();
            buffer.push(42);
        });
    }

    // Consumer: holds consumer resource, signals producer, then needs buffer.
    {
        let buffer_mutex = Arc::clone(&buffer_mutex);
        let consumer_mutex = Arc::clone(&consumer_mutex);
        let producer_cv = Arc::clone(&producer_cv);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            std::thread::sleep(Duration::from_millis(50));

            let _consumer_resource = consumer_mutex.lock();

            {
                let mut buffer = buffer_mutex.lock();
                if !buffer.is_empty() {
                    buffer.pop();
                }
            }

            producer_cv.notify_one();
            std::thread::sleep(Duration::from_millis(50));

            let _buffer = buffer_mutex.lock();
        });
    }

    barrier.wait();

    let info = expect_deadlock(&harness, DEADLOCK_TIMEOUT);
    assert_eq!(info.thread_cycle.len(), 2);
}
