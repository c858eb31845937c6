pub mod condvar;
pub mod mutex;
pub mod rwlock;
pub mod thread;

#[cfg(feature = "stress-test")]
pub mod stress;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
#[cfg(feature = "logging-and-visualization")]
use std::thread::JoinHandle;

use fxhash::FxHashMap;
use lazy_static::lazy_static;
use parking_lot::Mutex as PlMutex;

use crate::core::error::{CoreError, CoreResult};
use crate::core::graph::WaitForGraph;
use crate::core::logger::EventLogger;
use crate::core::registry::Registry;
use crate::core::types::{CondvarId, DeadlockInfo, LockId, ThreadId};

#[cfg(feature = "stress-test")]
use crate::core::stress::{StressConfig, StressMode};

/// The single process-wide serialization point: every registry, graph and
/// detector mutation happens with this lock held. It is always released
/// before the caller blocks on the real OS primitive.
pub struct Detector {
    pub registry: Registry,
    pub wait_for_graph: WaitForGraph,
    /// The resource (lock or condvar id) each thread currently waits for.
    pub thread_waits_for: FxHashMap<ThreadId, LockId>,
    pub logger: Option<EventLogger>,
    #[cfg(feature = "stress-test")]
    pub stress_mode: StressMode,
    #[cfg(feature = "stress-test")]
    pub stress_config: Option<StressConfig>,
}

impl Detector {
    fn new() -> Self {
        Detector {
            registry: Registry::new(),
            wait_for_graph: WaitForGraph::new(),
            thread_waits_for: FxHashMap::default(),
            logger: None,
            #[cfg(feature = "stress-test")]
            stress_mode: StressMode::None,
            #[cfg(feature = "stress-test")]
            stress_config: None,
        }
    }

    /// Holders an exclusive-mode acquisition conflicts with: every current
    /// reader and the writer, if any. This is correct for a mutex (its
    /// single holder) and for a write-lock request (which conflicts with
    /// every existing holder). It is deliberately *not* used for a blocked
    /// read-lock request: a reader only ever conflicts with a writer, never
    /// with a co-reader, so `rwlock::read_lock_begin` computes its own
    /// narrower holder set instead of calling this.
    fn conflicting_holders(&self, resource_id: LockId) -> Vec<ThreadId> {
        if let Some(m) = self.registry.mutexes.get(&resource_id) {
            return m.holder.into_iter().collect();
        }
        if let Some(r) = self.registry.rwlocks.get(&resource_id) {
            let mut holders: Vec<ThreadId> = r.readers.iter().copied().collect();
            holders.extend(r.writer);
            return holders;
        }
        // Other condvar waiters never conflict with a newly-parked waiter,
        // the same way concurrent rwlock readers never conflict with each
        // other: nothing is "held" exclusively by being asleep on a condvar.
        // The condvar wait edge exists for bookkeeping/logging; real
        // cross-thread dependencies surface once the waiter reacquires its
        // mutex through the ordinary mutex engine path.
        Vec::new()
    }

    /// Installs a wait edge `tid -> resource_id` for every current holder of
    /// `resource_id` and runs the cycle search. Returns the first cycle
    /// found, if any.
    fn record_wait_and_detect(&mut self, tid: ThreadId, resource_id: LockId) -> Option<Vec<ThreadId>> {
        let holders = self.conflicting_holders(resource_id);
        self.record_wait_and_detect_against(tid, resource_id, holders)
    }

    /// Like `record_wait_and_detect`, but against an explicit holder set
    /// rather than `conflicting_holders`'s default notion of conflict. Used
    /// where the generic mutex/writer-vs-everyone conflict rule is too
    /// coarse, e.g. a blocked reader never conflicts with co-readers, only
    /// with the writer (current or queued) holding it up.
    fn record_wait_and_detect_against(
        &mut self,
        tid: ThreadId,
        resource_id: LockId,
        holders: Vec<ThreadId>,
    ) -> Option<Vec<ThreadId>> {
        self.thread_waits_for.insert(tid, resource_id);
        let mut first_cycle = None;
        for holder in holders {
            if holder == tid {
                continue;
            }
            if let Some(cycle) = self.wait_for_graph.add_edge(tid, holder) {
                if first_cycle.is_none() {
                    first_cycle = Some(cycle);
                }
            }
        }
        // Note: a reader requesting a write upgrade on the same rwlock it
        // holds needs no special case here. If it is the only holder, there
        // is no conflicting edge yet (correct: no cycle without a partner).
        // If another reader holds the same lock, the loop above already
        // added an edge to that other thread, which is exactly the upgrade
        // deadlock's first half.
        first_cycle
    }

    fn clear_wait(&mut self, tid: ThreadId) {
        self.thread_waits_for.remove(&tid);
        self.wait_for_graph.clear_wait_edges(tid);
    }

    fn build_report(&self, cycle: Vec<ThreadId>) -> DeadlockInfo {
        let thread_waiting_for_locks = cycle
            .iter()
            .filter_map(|t| self.thread_waits_for.get(t).map(|&l| (*t, l)))
            .collect();
        DeadlockInfo {
            thread_cycle: cycle,
            thread_waiting_for_locks,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

lazy_static! {
    pub static ref GLOBAL_DETECTOR: PlMutex<Detector> = PlMutex::new(Detector::new());
    static ref DISPATCHER: Dispatcher = Dispatcher::new();
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);
static DEADLOCK_DETECTED: AtomicBool = AtomicBool::new(false);
static CALLBACK: OnceLock<Arc<dyn Fn(DeadlockInfo) + Send + Sync>> = OnceLock::new();

/// Dispatches deadlock reports to the user callback off the detector lock
/// and off the thread that discovered the cycle, so a callback that takes
/// application locks can never reenter the detector.
struct Dispatcher {
    #[cfg(feature = "logging-and-visualization")]
    sender: crossbeam_channel::Sender<DeadlockInfo>,
    #[cfg(feature = "logging-and-visualization")]
    _worker: JoinHandle<()>,
}

impl Dispatcher {
    #[cfg(feature = "logging-and-visualization")]
    fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded::<DeadlockInfo>();
        let worker = std::thread::Builder::new()
            .name("cyclewatch-dispatch".into())
            .spawn(move || {
                for info in receiver {
                    if let Some(cb) = CALLBACK.get() {
                        cb(info);
                    }
                }
            })
            .expect("failed to spawn dispatch thread");
        Dispatcher {
            sender,
            _worker: worker,
        }
    }

    #[cfg(not(feature = "logging-and-visualization"))]
    fn new() -> Self {
        Dispatcher {}
    }

    fn send(&self, info: DeadlockInfo) {
        #[cfg(feature = "logging-and-visualization")]
        {
            let _ = self.sender.send(info);
        }
        #[cfg(not(feature = "logging-and-visualization"))]
        {
            if let Some(cb) = CALLBACK.get() {
                let cb = cb.clone();
                std::thread::spawn(move || cb(info));
            }
        }
    }
}

/// Processes a cycle just found under the detector lock: latches the
/// detected flag, logs the terminal event, and dispatches the callback.
/// Must be called after the detector lock has been released.
fn process_deadlock(info: DeadlockInfo) {
    DEADLOCK_DETECTED.store(true, Ordering::SeqCst);
    {
        let mut det = GLOBAL_DETECTOR.lock();
        if let Some(logger) = det.logger.as_mut() {
            logger.log_deadlock(info.clone());
        }
    }
    DISPATCHER.send(info);
}

/// One-time initialization of the global detector. Returns
/// `AlreadyInitialized` on a second call.
pub fn init_detector(
    log_path: Option<String>,
    callback: Arc<dyn Fn(DeadlockInfo) + Send + Sync>,
) -> CoreResult<()> {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return Err(CoreError::AlreadyInitialized);
    }
    CALLBACK.set(callback).ok();
    if let Some(path) = log_path {
        let logger = EventLogger::with_file(&path)
            .map_err(|e| CoreError::IoFailure(e.to_string()))?;
        GLOBAL_DETECTOR.lock().logger = Some(logger);
    }
    Ok(())
}

#[cfg(feature = "stress-test")]
pub fn configure_stress(mode: StressMode, config: Option<StressConfig>) {
    let mut det = GLOBAL_DETECTOR.lock();
    det.stress_mode = mode;
    det.stress_config = config;
}

pub fn is_deadlock_detected() -> bool {
    DEADLOCK_DETECTED.load(Ordering::SeqCst)
}

pub fn reset_deadlock_flag() {
    DEADLOCK_DETECTED.store(false, Ordering::SeqCst);
}

pub fn is_logging_enabled() -> bool {
    GLOBAL_DETECTOR.lock().logger.is_some()
}

pub fn flush_logs() -> CoreResult<()> {
    let mut det = GLOBAL_DETECTOR.lock();
    if let Some(logger) = det.logger.as_mut() {
        logger
            .flush()
            .map_err(|e| CoreError::IoFailure(e.to_string()))?;
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn reset_for_tests() {
    INITIALIZED.store(false, Ordering::SeqCst);
    DEADLOCK_DETECTED.store(false, Ordering::SeqCst);
    let mut det = GLOBAL_DETECTOR.lock();
    *det = Detector::new();
}
