use cyclewatch::{Cyclewatch, DeadlockInfo};
use std::sync::{mpsc, Arc, Mutex as StdMutex};
use std::time::Duration;

pub const DEADLOCK_TIMEOUT: Duration = Duration::from_secs(3);
pub const NO_DEADLOCK_TIMEOUT: Duration = Duration::from_millis(500);

pub struct DetectorHarness {
    pub rx: mpsc::Receiver<DeadlockInfo>,
    pub detected: Arc<StdMutex<bool>>,
}

/// Starts the global detector with a callback wired to a channel. Every
/// test binary gets exactly one of these calls since the detector can
/// only be initialized once per process.
pub fn start_detector() -> DetectorHarness {
    let (tx, rx) = mpsc::channel::<DeadlockInfo>();
    let detected = Arc::new(StdMutex::new(false));

    let flag = detected.clone();
    Cyclewatch::new()
        .callback(move |info| {
            *flag.lock().unwrap() = true;
            let _ = tx.send(info);
        })
        .start()
        .expect("failed to initialize detector");

    DetectorHarness { rx, detected }
}

pub fn expect_deadlock(harness: &DetectorHarness, timeout: Duration) -> DeadlockInfo {
    let info = harness
        .rx
        .recv_timeout(timeout)
        .expect("no deadlock detected within timeout");
    assert!(*harness.detected.lock().unwrap(), "deadlock flag not set");
    info
}

pub fn assert_no_deadlock(harness: &DetectorHarness, timeout: Duration) {
    assert!(
        harness.rx.recv_timeout(timeout).is_err(),
        "unexpected deadlock detected"
    );
    assert!(
        !*harness.detected.lock().unwrap(),
        "deadlock flag should not be set"
    );
}
