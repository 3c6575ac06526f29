//! Visitation timeline
//!
//! Replays History into one snapshot per instant. Frame 0 is the state before
//! anything ran; frame `t + 1` is the state right after `history[t]`.

use crate::domain::error::TreeError;
use crate::domain::node::NodeId;
use serde::Serialize;

/// Visitation state of a node at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitState {
    Unvisited,
    /// Discovered, call not yet returned
    Open,
    Finished,
}

impl VisitState {
    fn advance(self) -> Option<Self> {
        match self {
            VisitState::Unvisited => Some(VisitState::Open),
            VisitState::Open => Some(VisitState::Finished),
            VisitState::Finished => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    frames: Vec<Vec<VisitState>>,
}

impl Timeline {
    /// Build `history.len() + 1` frames for nodes `0..node_count`.
    pub fn from_history(history: &[NodeId], node_count: usize) -> Result<Self, TreeError> {
        let mut current = vec![VisitState::Unvisited; node_count];
        let mut frames = Vec::with_capacity(history.len() + 1);
        frames.push(current.clone());

        for &id in history {
            let state = current.get_mut(id).ok_or(TreeError::UnknownNode(id))?;
            *state = state.advance().ok_or_else(|| {
                TreeError::MalformedHistory(format!("node {} visited a third time", id))
            })?;
            frames.push(current.clone());
        }

        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, time: usize) -> Option<&[VisitState]> {
        self.frames.get(time).map(Vec::as_slice)
    }

    pub fn frames(&self) -> &[Vec<VisitState>] {
        &self.frames
    }

    pub fn state_at(&self, time: usize, id: NodeId) -> Option<VisitState> {
        self.frames.get(time).and_then(|f| f.get(id)).copied()
    }
}
