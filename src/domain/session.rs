//! Trace Session and finished Trace
//!
//! A `TraceSession` is the mutable bookkeeping of one top-level invocation. It
//! is reset, not recreated, when the next top-level call starts. A `Trace` is
//! what a session becomes once the top-level call returns successfully.

use crate::domain::error::TreeError;
use crate::domain::node::{Node, NodeId};
use crate::domain::tree::CallTree;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Mutable state of the trace in progress.
#[derive(Debug)]
pub struct TraceSession<A, R> {
    nodes: BTreeMap<NodeId, Node<A, R>>,
    history: Vec<NodeId>,
    edge_labels: BTreeMap<NodeId, String>,
    cache: HashMap<A, R>,
    time: usize,
    depth: usize,
}

impl<A, R> Default for TraceSession<A, R> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            history: Vec::new(),
            edge_labels: BTreeMap::new(),
            cache: HashMap::new(),
            time: 0,
            depth: 0,
        }
    }
}

impl<A: Clone + Eq + Hash, R: Clone> TraceSession<A, R> {
    /// Clear nodes, history, labels, counters and the memoization cache.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.history.clear();
        self.edge_labels.clear();
        self.cache.clear();
        self.time = 0;
        self.depth = 0;
    }

    /// Record the discovery of a call and descend one level.
    pub(crate) fn open(&mut self, input: A) -> NodeId {
        let id = self.nodes.len();
        self.nodes
            .insert(id, Node::open(id, input, self.depth, self.time));
        self.history.push(id);
        self.time += 1;
        self.depth += 1;
        id
    }

    /// Climb back one level. Runs whether or not the call succeeded.
    pub(crate) fn ascend(&mut self) {
        debug_assert!(self.depth > 0);
        self.depth -= 1;
    }

    /// Store `value` unless the same arguments were already computed, and
    /// return the cached result.
    pub(crate) fn memoize(&mut self, args: A, value: R) -> R {
        self.cache.entry(args).or_insert(value).clone()
    }

    /// Record the return of call `id`.
    pub(crate) fn close(&mut self, id: NodeId, output: R, label: String) -> &Node<A, R> {
        let time = self.time;
        self.history.push(id);
        self.time += 1;
        self.edge_labels.insert(id, label);
        let node = self
            .nodes
            .get_mut(&id)
            .expect("closing a node that was never opened");
        node.close(output, time);
        node
    }

    /// Move the recorded data out into a finished `Trace`.
    pub(crate) fn finish(&mut self, function: &str) -> Trace<A, R> {
        Trace {
            function: function.to_string(),
            nodes: std::mem::take(&mut self.nodes),
            history: std::mem::take(&mut self.history),
            edge_labels: std::mem::take(&mut self.edge_labels),
        }
    }
}

impl<A, R> TraceSession<A, R> {
    pub fn nodes(&self) -> &BTreeMap<NodeId, Node<A, R>> {
        &self.nodes
    }

    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    pub fn edge_labels(&self) -> &BTreeMap<NodeId, String> {
        &self.edge_labels
    }

    pub fn cache(&self) -> &HashMap<A, R> {
        &self.cache
    }

    pub fn time(&self) -> usize {
        self.time
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// The complete record of one top-level invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace<A, R> {
    pub function: String,
    pub nodes: BTreeMap<NodeId, Node<A, R>>,
    /// Discovery/finish parenthesis sequence
    pub history: Vec<NodeId>,
    pub edge_labels: BTreeMap<NodeId, String>,
}

impl<A, R> Trace<A, R> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<A, R>> {
        self.nodes.get(&id)
    }

    /// The top-level call.
    pub fn root(&self) -> Option<&Node<A, R>> {
        self.nodes.get(&0)
    }

    pub fn call_tree(&self) -> Result<CallTree, TreeError> {
        CallTree::build(&self.history, &self.nodes, &self.edge_labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close_counters() {
        let mut session: TraceSession<u32, u32> = TraceSession::default();
        let root = session.open(3);
        let child = session.open(2);
        assert_eq!(session.depth(), 2);
        session.ascend();
        session.close(child, 20, "left".to_string());
        session.ascend();
        session.close(root, 30, String::new());

        assert_eq!(session.history(), &[0, 1, 1, 0]);
        assert_eq!(session.time(), 4);
        assert_eq!(session.depth(), 0);
        let node = &session.nodes()[&1];
        assert_eq!((node.depth, node.discovery, node.finish), (1, 1, Some(2)));
        assert_eq!(session.edge_labels()[&1], "left");
    }

    #[test]
    fn test_memoize_keeps_first_value() {
        let mut session: TraceSession<u32, u32> = TraceSession::default();
        assert_eq!(session.memoize(1, 10), 10);
        assert_eq!(session.memoize(1, 99), 10);
        assert_eq!(session.cache().len(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session: TraceSession<u32, u32> = TraceSession::default();
        let id = session.open(1);
        session.memoize(1, 1);
        session.reset();
        assert!(session.nodes().is_empty());
        assert!(session.history().is_empty());
        assert!(session.cache().is_empty());
        assert_eq!((session.time(), session.depth()), (0, 0));
        assert_eq!(id, 0);
    }

    #[test]
    fn test_finish_moves_data_into_trace() {
        let mut session: TraceSession<u32, u32> = TraceSession::default();
        let id = session.open(0);
        session.ascend();
        session.close(id, 0, String::new());
        let trace = session.finish("f");
        assert_eq!(trace.function, "f");
        assert_eq!(trace.history, vec![0, 0]);
        assert_eq!(trace.len(), 1);
        assert!(session.nodes().is_empty());
        assert!(trace.call_tree().unwrap().edges().is_empty());
    }
}
