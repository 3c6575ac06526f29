//! Call Tree Reconstruction
//!
//! Rebuilds the parent → child relation of a trace from two facts only: the
//! History parenthesis sequence and the depth recorded on each node. No parent
//! pointers are stored while tracing.
//!
//! 1. The preorder traversal is the order of first occurrence in History.
//! 2. Walking the preorder with a stack of open ancestors, a node at depth `d`
//!    closes every ancestor at depth `>= d`; whatever is left on top is its
//!    parent.

use crate::domain::error::TreeError;
use crate::domain::node::{Node, NodeId};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Anything that can report the recorded depth of a node id.
pub trait DepthLookup {
    fn depth_of(&self, id: NodeId) -> Option<usize>;
}

impl<A, R> DepthLookup for BTreeMap<NodeId, Node<A, R>> {
    fn depth_of(&self, id: NodeId) -> Option<usize> {
        self.get(&id).map(|n| n.depth)
    }
}

impl DepthLookup for HashMap<NodeId, usize> {
    fn depth_of(&self, id: NodeId) -> Option<usize> {
        self.get(&id).copied()
    }
}

/// A directed parent → child edge, labeled with the child's edge label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEdge {
    pub parent: NodeId,
    pub child: NodeId,
    pub label: String,
}

/// Node ids in order of first discovery.
pub fn preorder_traversal(history: &[NodeId]) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    history.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Depth-keyed stack reconstruction over a preorder sequence.
///
/// Missing labels read as the empty string.
pub fn reconstruct_edges<D: DepthLookup + ?Sized>(
    depths: &D,
    preorder: &[NodeId],
    labels: &BTreeMap<NodeId, String>,
) -> Result<Vec<TreeEdge>, TreeError> {
    let mut edges = Vec::with_capacity(preorder.len().saturating_sub(1));
    let mut stack: Vec<NodeId> = Vec::new();
    let mut root: Option<NodeId> = None;

    for &id in preorder {
        let depth = depths.depth_of(id).ok_or(TreeError::UnknownNode(id))?;
        if depth > stack.len() {
            return Err(TreeError::DepthGap {
                id,
                depth,
                open: stack.len(),
            });
        }
        stack.truncate(depth);

        match stack.last() {
            Some(&parent) => edges.push(TreeEdge {
                parent,
                child: id,
                label: labels.get(&id).cloned().unwrap_or_default(),
            }),
            None => {
                if let Some(first) = root {
                    return Err(TreeError::MultipleRoots { id, root: first });
                }
                root = Some(id);
            }
        }
        stack.push(id);
    }

    Ok(edges)
}

/// Check that every id occurs exactly twice.
pub fn validate_history(history: &[NodeId]) -> Result<(), TreeError> {
    if history.len() % 2 != 0 {
        return Err(TreeError::MalformedHistory(format!(
            "odd length {}",
            history.len()
        )));
    }
    let mut counts: BTreeMap<NodeId, usize> = BTreeMap::new();
    for &id in history {
        *counts.entry(id).or_default() += 1;
    }
    if let Some((id, count)) = counts.iter().find(|(_, count)| **count != 2) {
        return Err(TreeError::MalformedHistory(format!(
            "node {} occurs {} times",
            id, count
        )));
    }
    Ok(())
}

/// The reconstructed call tree of one trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallTree {
    root: Option<NodeId>,
    preorder: Vec<NodeId>,
    edges: Vec<TreeEdge>,
    children: BTreeMap<NodeId, Vec<NodeId>>,
    parents: BTreeMap<NodeId, NodeId>,
}

impl CallTree {
    /// Validate History, extract the preorder, and rebuild the edges.
    pub fn build<D: DepthLookup + ?Sized>(
        history: &[NodeId],
        depths: &D,
        labels: &BTreeMap<NodeId, String>,
    ) -> Result<Self, TreeError> {
        validate_history(history)?;
        let preorder = preorder_traversal(history);
        let edges = reconstruct_edges(depths, &preorder, labels)?;

        let mut children: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        let mut parents = BTreeMap::new();
        for edge in &edges {
            children.entry(edge.parent).or_default().push(edge.child);
            parents.insert(edge.child, edge.parent);
        }

        Ok(Self {
            root: preorder.first().copied(),
            preorder,
            edges,
            children,
            parents,
        })
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// All vertices, in preorder.
    pub fn preorder(&self) -> &[NodeId] {
        &self.preorder
    }

    pub fn edges(&self) -> &[TreeEdge] {
        &self.edges
    }

    /// Children of `id` in call order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Label of the edge into `id`; `None` for the root or unknown ids.
    pub fn edge_label(&self, id: NodeId) -> Option<&str> {
        self.edges
            .iter()
            .find(|e| e.child == id)
            .map(|e| e.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.preorder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preorder.is_empty()
    }
}
