use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{LogEvent, ThreadId};

/// A point-in-time snapshot of the wait-for graph, attached to every log
/// line so an external viewer can animate it without replaying the whole
/// stream from the start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphState {
    pub threads: Vec<ThreadId>,
    pub edges: Vec<(ThreadId, ThreadId)>,
}

/// Maintains the running graph snapshot the logger attaches to each event.
#[derive(Default)]
pub struct GraphLogger {
    threads: FxHashSet<ThreadId>,
    edges: FxHashSet<(ThreadId, ThreadId)>,
}

impl GraphLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &LogEvent) {
        match event {
            LogEvent::ThreadSpawn { thread_id, .. } => {
                self.threads.insert(*thread_id);
            }
            LogEvent::ThreadExit { thread_id } => {
                self.threads.remove(thread_id);
                self.edges.retain(|(a, b)| a != thread_id && b != thread_id);
            }
            _ => {}
        }
    }

    pub fn set_wait_edge(&mut self, from: ThreadId, to: ThreadId) {
        self.edges.insert((from, to));
    }

    pub fn clear_wait_edges_from(&mut self, from: ThreadId) {
        self.edges.retain(|(a, _)| *a != from);
    }

    pub fn snapshot(&self) -> GraphState {
        GraphState {
            threads: self.threads.iter().copied().collect(),
            edges: self.edges.iter().copied().collect(),
        }
    }
}
