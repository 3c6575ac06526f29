use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::error::TreeError;
use crate::domain::node::{join_display_parts, CallArgs, CallOutput, NodeId};
use crate::domain::session::Trace;
use crate::domain::tree::{CallTree, DepthLookup};

/// Everything a renderer needs from a finished trace, with the generic
/// argument and result values already turned into display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDto {
    pub function: String,
    pub nodes: Vec<NodeDto>,
    pub history: Vec<NodeId>,
    pub edge_labels: BTreeMap<NodeId, String>,
    pub edges: Vec<EdgeDto>,
    /// Argument indices shown on node labels; `None` shows all
    #[serde(default)]
    pub display_args: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: NodeId,
    pub args: Vec<String>,
    pub output: String,
    pub depth: usize,
    pub discovery: usize,
    pub finish: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDto {
    pub from: NodeId,
    pub to: NodeId,
    pub label: String,
}

impl TraceDto {
    /// Rebuild the call tree of `trace` and flatten it for rendering.
    pub fn from_trace<A, R>(
        trace: &Trace<A, R>,
        display_args: Option<Vec<usize>>,
    ) -> Result<Self, TreeError>
    where
        A: CallArgs,
        R: CallOutput,
    {
        let tree = trace.call_tree()?;

        let nodes = trace
            .nodes
            .values()
            .map(|n| NodeDto {
                id: n.id,
                args: n.input.display_parts(),
                output: n
                    .output
                    .as_ref()
                    .map(CallOutput::display_output)
                    .unwrap_or_default(),
                depth: n.depth,
                discovery: n.discovery,
                finish: n.finish.unwrap_or(n.discovery),
            })
            .collect();

        let edges = tree
            .edges()
            .iter()
            .map(|e| EdgeDto {
                from: e.parent,
                to: e.child,
                label: e.label.clone(),
            })
            .collect();

        Ok(TraceDto {
            function: trace.function.clone(),
            nodes,
            history: trace.history.clone(),
            edge_labels: trace.edge_labels.clone(),
            edges,
            display_args,
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeDto> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Text drawn inside a node: the selected arguments joined by `,`.
    pub fn node_text(&self, node: &NodeDto) -> String {
        join_display_parts(&node.args, self.display_args.as_deref())
    }

    /// `f(args)=output`, always with every argument.
    pub fn call_text(&self, node: &NodeDto) -> String {
        format!("{}({})={}", self.function, node.args.join(","), node.output)
    }

    /// Root arguments joined by `,`; empty for an empty trace.
    pub fn root_input(&self) -> String {
        self.node(0).map(|n| n.args.join(",")).unwrap_or_default()
    }

    /// `Recursive Tree: f(args)`
    pub fn title(&self) -> String {
        format!("Recursive Tree: {}({})", self.function, self.root_input())
    }

    /// Rebuild the tree from the flattened data alone.
    pub fn call_tree(&self) -> Result<CallTree, TreeError> {
        CallTree::build(&self.history, self.nodes.as_slice(), &self.edge_labels)
    }
}

impl DepthLookup for [NodeDto] {
    fn depth_of(&self, id: NodeId) -> Option<usize> {
        // Tracer output lists nodes by id, so try the direct slot first.
        match self.get(id) {
            Some(n) if n.id == id => Some(n.depth),
            _ => self.iter().find(|n| n.id == id).map(|n| n.depth),
        }
    }
}
