use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex as StdMutex};
use std::thread::JoinHandle;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::logger::graph_logger::{GraphLogger, GraphState};
use crate::core::types::{CondvarId, DeadlockInfo, LockId, LogEvent, ThreadId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedLogEntry {
    pub event: LogEvent,
    pub monotonic_seconds: f64,
    pub graph: GraphState,
}

enum LoggerCommand {
    Entry(CombinedLogEntry),
    Flush(Sender<()>),
}

/// Ordered, best-effort stream of structured events. The detector lock only
/// ever touches the in-memory `GraphLogger` snapshot and sends a command
/// down an `mpsc` channel; the actual `serde_json` serialization and
/// `write!` happen on a dedicated background thread, so the detector lock
/// is never held during I/O.
pub struct EventLogger {
    sender: Sender<LoggerCommand>,
    graph_logger: StdMutex<GraphLogger>,
    start: Instant,
    path: PathBuf,
    _worker: JoinHandle<()>,
}

fn render_log_path(template: &str) -> PathBuf {
    if template.contains("{timestamp}") {
        let ts = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        PathBuf::from(template.replace("{timestamp}", &ts))
    } else {
        PathBuf::from(template)
    }
}

fn async_logger_thread(path: PathBuf, receiver: mpsc::Receiver<LoggerCommand>) {
    let file = OpenOptions::new().create(true).append(true).open(&path);
    let mut file = match file {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cyclewatch: failed to open log file {path:?}: {e}");
            return;
        }
    };

    for cmd in receiver {
        match cmd {
            LoggerCommand::Entry(entry) => match serde_json::to_string(&entry) {
                Ok(line) => {
                    if let Err(e) = writeln!(file, "{line}") {
                        eprintln!("cyclewatch: log write failed: {e}");
                    }
                }
                Err(e) => eprintln!("cyclewatch: failed to serialize log entry: {e}"),
            },
            LoggerCommand::Flush(ack) => {
                if let Err(e) = file.flush() {
                    eprintln!("cyclewatch: log flush failed: {e}");
                }
                let _ = ack.send(());
            }
        }
    }
}

impl EventLogger {
    pub fn with_file(path_template: &str) -> io::Result<Self> {
        let path = render_log_path(path_template);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let (sender, receiver) = mpsc::channel::<LoggerCommand>();
        let worker_path = path.clone();
        let worker = std::thread::Builder::new()
            .name("cyclewatch-logger".into())
            .spawn(move || async_logger_thread(worker_path, receiver))?;

        set_current_log_path(&path);
        Ok(EventLogger {
            sender,
            graph_logger: StdMutex::new(GraphLogger::new()),
            start: Instant::now(),
            path,
            _worker: worker,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn send_event(&mut self, event: LogEvent) {
        let mut gl = self.graph_logger.lock().unwrap();
        gl.apply(&event);
        let graph = gl.snapshot();
        drop(gl);
        let entry = CombinedLogEntry {
            event,
            monotonic_seconds: self.start.elapsed().as_secs_f64(),
            graph,
        };
        let _ = self.sender.send(LoggerCommand::Entry(entry));
    }

    pub fn log_thread_spawn(&mut self, thread_id: ThreadId, parent_id: Option<ThreadId>) {
        self.send_event(LogEvent::ThreadSpawn { thread_id, parent_id });
    }

    pub fn log_thread_exit(&mut self, thread_id: ThreadId) {
        self.send_event(LogEvent::ThreadExit { thread_id });
    }

    pub fn log_mutex_create(&mut self, lock_id: LockId, creator_id: Option<ThreadId>) {
        self.send_event(LogEvent::MutexCreate { lock_id, creator_id });
    }

    pub fn log_mutex_destroy(&mut self, lock_id: LockId) {
        self.send_event(LogEvent::MutexDestroy { lock_id });
    }

    /// Records that `thread_id` is now blocked on whatever resource
    /// `holder` holds, so the graph snapshot attached to every subsequent
    /// log line (until the wait clears) carries this edge. Does not emit a
    /// log line of its own; the next event from any thread picks it up.
    pub fn log_wait_edge(&mut self, thread_id: ThreadId, holder: ThreadId) {
        self.graph_logger.lock().unwrap().set_wait_edge(thread_id, holder);
    }

    pub fn log_mutex_lock(&mut self, thread_id: ThreadId, lock_id: LockId) {
        self.graph_logger.lock().unwrap().clear_wait_edges_from(thread_id);
        self.send_event(LogEvent::MutexLock { thread_id, lock_id });
    }

    pub fn log_mutex_unlock(&mut self, thread_id: ThreadId, lock_id: LockId) {
        self.send_event(LogEvent::MutexUnlock { thread_id, lock_id });
    }

    pub fn log_rwlock_create(&mut self, lock_id: LockId, creator_id: Option<ThreadId>) {
        self.send_event(LogEvent::RwLockCreate { lock_id, creator_id });
    }

    pub fn log_rwlock_destroy(&mut self, lock_id: LockId) {
        self.send_event(LogEvent::RwLockDestroy { lock_id });
    }

    pub fn log_rwlock_read_lock(&mut self, thread_id: ThreadId, lock_id: LockId) {
        self.graph_logger.lock().unwrap().clear_wait_edges_from(thread_id);
        self.send_event(LogEvent::RwLockReadLock { thread_id, lock_id });
    }

    pub fn log_rwlock_read_unlock(&mut self, thread_id: ThreadId, lock_id: LockId) {
        self.send_event(LogEvent::RwLockReadUnlock { thread_id, lock_id });
    }

    pub fn log_rwlock_write_lock(&mut self, thread_id: ThreadId, lock_id: LockId) {
        self.graph_logger.lock().unwrap().clear_wait_edges_from(thread_id);
        self.send_event(LogEvent::RwLockWriteLock { thread_id, lock_id });
    }

    pub fn log_rwlock_write_unlock(&mut self, thread_id: ThreadId, lock_id: LockId) {
        self.send_event(LogEvent::RwLockWriteUnlock { thread_id, lock_id });
    }

    pub fn log_condvar_create(&mut self, condvar_id: CondvarId, creator_id: Option<ThreadId>) {
        self.send_event(LogEvent::CondvarCreate { condvar_id, creator_id });
    }

    pub fn log_condvar_destroy(&mut self, condvar_id: CondvarId) {
        self.send_event(LogEvent::CondvarDestroy { condvar_id });
    }

    pub fn log_condvar_wait(&mut self, thread_id: ThreadId, condvar_id: CondvarId, mutex_id: LockId) {
        self.send_event(LogEvent::CondvarWait {
            thread_id,
            condvar_id,
            mutex_id,
        });
    }

    pub fn log_condvar_wait_end(&mut self, thread_id: ThreadId, condvar_id: CondvarId) {
        self.graph_logger.lock().unwrap().clear_wait_edges_from(thread_id);
        self.send_event(LogEvent::CondvarWaitEnd { thread_id, condvar_id });
    }

    pub fn log_condvar_notify_one(&mut self, condvar_id: CondvarId) {
        self.send_event(LogEvent::CondvarNotifyOne { condvar_id });
    }

    pub fn log_condvar_notify_all(&mut self, condvar_id: CondvarId) {
        self.send_event(LogEvent::CondvarNotifyAll { condvar_id });
    }

    pub fn log_destroy_deferred(&mut self, resource_id: u64) {
        self.send_event(LogEvent::DestroyDeferred { resource_id });
    }

    pub fn log_deadlock(&mut self, info: DeadlockInfo) {
        self.send_event(LogEvent::Deadlock { info });
    }

    pub fn flush(&mut self) -> io::Result<()> {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.sender.send(LoggerCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
        Ok(())
    }
}

/// Tracks the most recently opened log file path, surfaced through
/// `current_log_path` for the showcase CLI's default argument.
pub fn current_log_path() -> Option<PathBuf> {
    CURRENT_LOG_FILE.lock().unwrap().clone()
}

pub fn set_current_log_path(path: &Path) {
    *CURRENT_LOG_FILE.lock().unwrap() = Some(path.to_path_buf());
}

lazy_static::lazy_static! {
    static ref CURRENT_LOG_FILE: Arc<StdMutex<Option<PathBuf>>> = Arc::new(StdMutex::new(None));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_basic_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let mut logger = EventLogger::with_file(path.to_str().unwrap()).unwrap();
        logger.log_thread_spawn(1, None);
        logger.log_mutex_create(10, Some(1));
        logger.log_mutex_lock(1, 10);
        logger.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert!(serde_json::from_str::<CombinedLogEntry>(line).is_ok());
        }
    }

    #[test]
    fn test_flush_idempotence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let mut logger = EventLogger::with_file(path.to_str().unwrap()).unwrap();
        logger.log_thread_spawn(1, None);
        logger.flush().unwrap();
        logger.flush().unwrap();
        thread::sleep(Duration::from_millis(10));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[test]
    fn test_graph_state_per_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path_a = dir.path().join("a.ndjson");
        let path_b = dir.path().join("b.ndjson");
        let mut a = EventLogger::with_file(path_a.to_str().unwrap()).unwrap();
        let mut b = EventLogger::with_file(path_b.to_str().unwrap()).unwrap();
        a.log_thread_spawn(1, None);
        b.log_thread_spawn(2, None);
        a.flush().unwrap();
        b.flush().unwrap();

        let a_contents = std::fs::read_to_string(&path_a).unwrap();
        let entry: CombinedLogEntry = serde_json::from_str(a_contents.lines().next().unwrap()).unwrap();
        assert_eq!(entry.graph.threads, vec![1]);
    }

    #[test]
    fn test_wait_edge_appears_in_graph_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let mut logger = EventLogger::with_file(path.to_str().unwrap()).unwrap();
        logger.log_thread_spawn(1, None);
        logger.log_thread_spawn(2, None);
        logger.log_mutex_create(10, Some(1));
        logger.log_mutex_lock(1, 10);
        // Thread 2 blocks behind thread 1's hold; the next line logged from
        // either thread must carry that edge in its graph snapshot.
        logger.log_wait_edge(2, 1);
        logger.log_thread_spawn(3, None);
        logger.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let last_entry: CombinedLogEntry =
            serde_json::from_str(contents.lines().last().unwrap()).unwrap();
        assert!(last_entry.graph.edges.contains(&(2, 1)));
    }
}
