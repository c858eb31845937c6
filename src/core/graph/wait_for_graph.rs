use fxhash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

use crate::core::types::ThreadId;

/// Directed graph over thread ids: an edge `from -> to` means `from` is
/// blocked waiting on a resource that `to` holds in a conflicting mode.
///
/// Maintains both the forward adjacency (used for the BFS cycle search) and
/// the reverse adjacency (used so `remove_thread` can drop every edge
/// touching a thread in O(degree) instead of scanning the whole graph).
#[derive(Default)]
pub struct WaitForGraph {
    edges: FxHashMap<ThreadId, FxHashSet<ThreadId>>,
    incoming_edges: FxHashMap<ThreadId, FxHashSet<ThreadId>>,
}

impl WaitForGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `from` now waits for `to`. If this edge would close a
    /// cycle (i.e. a path already exists from `to` back to `from`), the
    /// edge is still recorded and the cycle is returned as a thread-id path
    /// starting at `from`.
    pub fn add_edge(&mut self, from: ThreadId, to: ThreadId) -> Option<Vec<ThreadId>> {
        let cycle = if from == to {
            Some(vec![from])
        } else {
            // A path already reaching `from` from `to` means the new edge
            // `from -> to` closes a cycle. `find_path` returns the path
            // inclusive of both ends, e.g. [to, x1, .., from]; rotate it so
            // the cycle starts at the newly-blocked thread.
            self.find_path(to, from).map(|path| {
                let mut cycle = vec![from];
                cycle.extend_from_slice(&path[..path.len() - 1]);
                cycle
            })
        };

        self.edges.entry(from).or_default().insert(to);
        self.incoming_edges.entry(to).or_default().insert(from);
        // Ensure both endpoints have entries so remove_thread/degree queries
        // behave even for threads with no outgoing edges.
        self.edges.entry(to).or_default();
        self.incoming_edges.entry(from).or_default();

        cycle
    }

    pub fn remove_edge(&mut self, from: ThreadId, to: ThreadId) {
        if let Some(set) = self.edges.get_mut(&from) {
            set.remove(&to);
        }
        if let Some(set) = self.incoming_edges.get_mut(&to) {
            set.remove(&from);
        }
    }

    /// Removes every outgoing wait edge for `thread_id` (a thread has at
    /// most one at a time, but this clears unconditionally).
    pub fn clear_wait_edges(&mut self, thread_id: ThreadId) {
        if let Some(targets) = self.edges.get_mut(&thread_id) {
            let targets = std::mem::take(targets);
            for target in targets {
                if let Some(set) = self.incoming_edges.get_mut(&target) {
                    set.remove(&thread_id);
                }
            }
        }
    }

    /// Removes a thread and every edge touching it, forward or reverse.
    pub fn remove_thread(&mut self, thread_id: ThreadId) {
        if let Some(targets) = self.edges.remove(&thread_id) {
            for target in targets {
                if let Some(set) = self.incoming_edges.get_mut(&target) {
                    set.remove(&thread_id);
                }
            }
        }
        if let Some(sources) = self.incoming_edges.remove(&thread_id) {
            for source in sources {
                if let Some(set) = self.edges.get_mut(&source) {
                    set.remove(&thread_id);
                }
            }
        }
    }

    /// Breadth-first search for a path from `start` to `goal`, returned as
    /// `[start, ..., goal]` if one exists.
    fn find_path(&self, start: ThreadId, goal: ThreadId) -> Option<Vec<ThreadId>> {
        if start == goal {
            return Some(vec![start]);
        }

        let mut visited: FxHashSet<ThreadId> = FxHashSet::default();
        let mut parent: FxHashMap<ThreadId, ThreadId> = FxHashMap::default();
        let mut queue: VecDeque<ThreadId> = VecDeque::new();

        visited.insert(start);
        queue.push_back(start);

        while let Some(node) = queue.pop_front() {
            let Some(neighbors) = self.edges.get(&node) else {
                continue;
            };
            for &next in neighbors {
                if visited.contains(&next) {
                    continue;
                }
                visited.insert(next);
                parent.insert(next, node);
                if next == goal {
                    let mut path = vec![goal];
                    let mut cur = goal;
                    while let Some(&p) = parent.get(&cur) {
                        path.push(p);
                        cur = p;
                        if cur == start {
                            break;
                        }
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_cycle_on_acyclic_chain() {
        let mut g = WaitForGraph::new();
        assert!(g.add_edge(1, 2).is_none());
        assert!(g.add_edge(2, 3).is_none());
    }

    #[test]
    fn detects_two_cycle() {
        let mut g = WaitForGraph::new();
        assert!(g.add_edge(1, 2).is_none());
        let cycle = g.add_edge(2, 1).expect("expected cycle");
        assert_eq!(cycle, vec![2, 1]);
    }

    #[test]
    fn detects_longer_cycle() {
        let mut g = WaitForGraph::new();
        assert!(g.add_edge(1, 2).is_none());
        assert!(g.add_edge(2, 3).is_none());
        let cycle = g.add_edge(3, 1).expect("expected cycle");
        assert_eq!(cycle, vec![3, 1, 2]);
    }

    #[test]
    fn remove_thread_clears_all_edges() {
        let mut g = WaitForGraph::new();
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        g.remove_thread(2);
        assert!(g.add_edge(3, 1).is_none());
        assert!(g.add_edge(1, 3).is_none());
    }
}
