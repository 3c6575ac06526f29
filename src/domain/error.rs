//! Error types for call-tree reconstruction.
//!
//! Every variant describes a History/depth correspondence the tracer can never
//! produce, so seeing one means the input was not recorded by a tracer (or the
//! tracer has a defect). Reconstruction stops at the first one.

use crate::domain::node::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// History references a node whose depth was never recorded
    #[error("node {0} appears in history but has no recorded depth")]
    UnknownNode(NodeId),

    /// A node is nested more than one level below the open ancestor chain
    #[error("node {id} has depth {depth} but only {open} ancestors are open")]
    DepthGap {
        id: NodeId,
        depth: usize,
        open: usize,
    },

    /// A second depth-0 node appeared in the same trace
    #[error("node {id} is a second root (first root was {root})")]
    MultipleRoots { id: NodeId, root: NodeId },

    /// History length or occurrence counts do not form a parenthesis sequence
    #[error("malformed history: {0}")]
    MalformedHistory(String),
}
