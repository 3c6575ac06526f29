//! Static tree layout
//!
//! Computed once per trace from the tree shape. Leaves take consecutive
//! unit-spaced slots in preorder; every parent sits midway between its first
//! and last child; `y` is the depth.

use crate::domain::node::NodeId;
use crate::domain::tree::CallTree;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    positions: BTreeMap<NodeId, Point>,
    leaves: usize,
    max_depth: usize,
}

impl Layout {
    pub fn compute(tree: &CallTree) -> Self {
        let mut positions: BTreeMap<NodeId, Point> = BTreeMap::new();
        let mut leaves = 0;
        let mut max_depth = 0;

        // Parents precede children in preorder.
        for &id in tree.preorder() {
            let depth = tree
                .parent(id)
                .and_then(|p| positions.get(&p))
                .map(|p| p.y as usize + 1)
                .unwrap_or(0);
            max_depth = max_depth.max(depth);

            let x = if tree.children(id).is_empty() {
                leaves += 1;
                (leaves - 1) as f64
            } else {
                0.0
            };
            positions.insert(id, Point { x, y: depth as f64 });
        }

        // Children follow parents, so the reverse order settles them first.
        for &id in tree.preorder().iter().rev() {
            let children = tree.children(id);
            if let (Some(first), Some(last)) = (children.first(), children.last()) {
                let x = (positions[first].x + positions[last].x) / 2.0;
                if let Some(p) = positions.get_mut(&id) {
                    p.x = x;
                }
            }
        }

        Self {
            positions,
            leaves,
            max_depth,
        }
    }

    pub fn position(&self, id: NodeId) -> Option<Point> {
        self.positions.get(&id).copied()
    }

    pub fn positions(&self) -> &BTreeMap<NodeId, Point> {
        &self.positions
    }

    /// Number of leaf slots across.
    pub fn width(&self) -> usize {
        self.leaves
    }

    /// Number of levels below the root.
    pub fn height(&self) -> usize {
        self.max_depth
    }

    /// Where an edge label goes.
    pub fn midpoint(&self, from: NodeId, to: NodeId) -> Option<Point> {
        let a = self.position(from)?;
        let b = self.position(to)?;
        Some(Point {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
        })
    }
}
