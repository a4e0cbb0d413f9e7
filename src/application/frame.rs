//! Scene description handed to the rendering surface after every recompute.

use serde::{Deserialize, Serialize};

use crate::application::visibility::NodeState;
use crate::application::viewport::Point;
use crate::domain::{NodeKey, Side};

/// Identity of a node across recomputes. Assigned on first appearance, never reused.
pub type StableId = u64;

/// Spacing and decoration settings for [`crate::application::LayoutController`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal pixels per label character
    pub char_width: f64,
    /// Vertical pixels per label character and level
    pub level_factor: f64,
    pub sibling_separation: f64,
    pub subtree_separation: f64,
    pub pass_bar_width: f64,
    pub pass_bar_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            char_width: 6.0,
            level_factor: 4.0,
            sibling_separation: 1.0,
            subtree_separation: 2.0,
            pass_bar_width: 25.0,
            pass_bar_height: 5.0,
        }
    }
}

/// Current and previous position of a visible node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutState {
    pub stable_id: StableId,
    pub x: f64,
    pub y: f64,
    /// Where a move/enter transition starts
    pub previous_x: f64,
    pub previous_y: f64,
}

impl LayoutState {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn previous(&self) -> Point {
        Point::new(self.previous_x, self.previous_y)
    }
}

/// Green/red bar under a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PassBar {
    pub passed_width: f64,
    pub failed_width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafInfo {
    pub pass_fail_ratio: String,
    /// NaN (serialized as null) when the leaf has no observations
    pub pass_total_ratio: f64,
    pub pass_bar: PassBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    #[serde(skip)]
    pub key: NodeKey,
    pub name: String,
    pub side: Side,
    pub depth: usize,
    pub state: NodeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_mark: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaf: Option<LeafInfo>,
    pub layout: LayoutState,
}

/// Connection between a visible node and one of its visible children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameEdge {
    pub parent: LayoutState,
    pub child: LayoutState,
    pub side: Side,
    /// `"> mark"` on the left branch, `"<= mark"` on the right
    pub label: String,
}

/// A node that was visible in the previous frame and is gone now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitingNode {
    #[serde(skip)]
    pub key: NodeKey,
    pub stable_id: StableId,
    pub name: String,
    /// Last drawn position
    pub from: Point,
    /// Exit target: the triggering node's new position
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Stable id of the node that triggered the recompute
    pub source: StableId,
    /// Triggering node's previous position; entering nodes start here
    pub origin: Point,
    /// Triggering node's new position
    pub anchor: Point,
    /// Visible nodes in pre-order
    pub nodes: Vec<PlacedNode>,
    pub edges: Vec<FrameEdge>,
    pub entering: Vec<StableId>,
    pub exiting: Vec<ExitingNode>,
}

impl Frame {
    pub fn node(&self, stable_id: StableId) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.layout.stable_id == stable_id)
    }

    pub fn find(&self, name: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    pub fn stable_ids(&self) -> Vec<StableId> {
        self.nodes.iter().map(|n| n.layout.stable_id).collect()
    }
}
