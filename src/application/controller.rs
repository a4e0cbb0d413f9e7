//! Layout/visibility controller
//!
//! Owns the view state of one rendered tree: which subtrees are collapsed,
//! the stable identity of every node that has ever been shown, and the
//! positions of the last layout. Every visibility change produces a new
//! [`Frame`] for the rendering surface.

use std::collections::HashMap;

use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::application::error_ext::IoResultExt;
use crate::application::frame::{
    ExitingNode, Frame, FrameEdge, LayoutConfig, LayoutState, LeafInfo, PassBar, PlacedNode,
    StableId,
};
use crate::application::viewport::{Point, Viewport, ViewportConfig};
use crate::application::visibility::{NodeState, VisibilityMap, VisibilityState};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    tidy_layout, traverse, unit_span, DisplayTree, DomainError, NodeKey, NodeKind, Side,
    TidyConfig,
};
use crate::infrastructure::traits::RenderSurface;

/// Transition length in milliseconds.
pub const DEFAULT_TRANSITION_MS: u64 = 750;

pub struct LayoutController<S: RenderSurface> {
    tree: DisplayTree,
    visibility: VisibilityMap,
    stable_ids: HashMap<NodeKey, StableId>,
    last_id: StableId,
    /// Positions of the currently visible nodes
    positions: HashMap<NodeKey, Point>,
    viewport: Viewport,
    config: LayoutConfig,
    transition_ms: u64,
    surface: S,
}

impl<S: RenderSurface> LayoutController<S> {
    /// Controller for `tree`, fully expanded, nothing laid out yet.
    pub fn new(tree: DisplayTree, surface: S) -> Self {
        let visibility = VisibilityMap::fully_expanded(&tree);
        Self {
            tree,
            visibility,
            stable_ids: HashMap::new(),
            last_id: 0,
            positions: HashMap::new(),
            viewport: Viewport::new(ViewportConfig::default()),
            config: LayoutConfig::default(),
            transition_ms: DEFAULT_TRANSITION_MS,
            surface,
        }
    }

    pub fn with_layout_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_viewport(mut self, config: ViewportConfig) -> Self {
        self.viewport = Viewport::new(config);
        self
    }

    pub fn with_transition_ms(mut self, transition_ms: u64) -> Self {
        self.transition_ms = transition_ms;
        self
    }

    pub fn tree(&self) -> &DisplayTree {
        &self.tree
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn node_state(&self, key: NodeKey) -> Option<NodeState> {
        self.visibility.state(key)
    }

    pub fn visibility(&self, key: NodeKey) -> Option<&VisibilityState> {
        self.visibility.get(key)
    }

    pub fn stable_id(&self, key: NodeKey) -> Option<StableId> {
        self.stable_ids.get(&key).copied()
    }

    /// Position of `key` in the last layout, None if it is not visible.
    pub fn layout_of(&self, key: NodeKey) -> Option<Point> {
        self.positions.get(&key).copied()
    }

    /// Nodes of the last layout, in no particular order.
    pub fn visible_keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.positions.keys().copied()
    }

    /// Lay out the tree for the first time and center on the root.
    #[instrument(level = "debug", skip(self))]
    pub fn render_initial(&mut self) -> ApplicationResult<Frame> {
        let root = self.require_root()?;
        self.refresh(root)
    }

    /// Flip `key` between expanded and collapsed, lay out again and keep the
    /// node under the viewport center.
    ///
    /// Descendants keep their own state. Toggling a leaf changes nothing but
    /// still re-centers the view on it.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle(&mut self, key: NodeKey) -> ApplicationResult<Frame> {
        let state = self
            .visibility
            .get_mut(key)
            .ok_or(ApplicationError::Domain(DomainError::UnknownNode))?;
        state.toggle();
        debug!(state = ?state.state(), "toggled node");
        self.refresh(key)
    }

    /// [`Self::toggle`] addressed by the record's `nodeNumber`.
    pub fn toggle_by_number(&mut self, node_number: i64) -> ApplicationResult<Frame> {
        let key = self
            .tree
            .find_by_number(node_number)
            .ok_or(DomainError::NodeNotFound(node_number))?;
        self.toggle(key)
    }

    /// Collapse every internal node.
    pub fn collapse_all(&mut self) -> ApplicationResult<Frame> {
        let root = self.require_root()?;
        self.visibility.collapse_all(&self.tree, root);
        self.refresh(root)
    }

    /// Expand every internal node.
    pub fn expand_all(&mut self) -> ApplicationResult<Frame> {
        let root = self.require_root()?;
        self.visibility.expand_all(&self.tree, root);
        self.refresh(root)
    }

    fn require_root(&self) -> ApplicationResult<NodeKey> {
        self.tree
            .root()
            .ok_or_else(|| ApplicationError::InvalidState("cannot lay out an empty tree".into()))
    }

    fn refresh(&mut self, source: NodeKey) -> ApplicationResult<Frame> {
        let frame = self.recompute(source)?;
        let transform = self.viewport.center_on(frame.anchor);
        self.surface
            .present(&frame, self.transition_ms)
            .with_context("present frame")?;
        self.surface
            .center(&transform, self.transition_ms)
            .with_context("center viewport")?;
        Ok(frame)
    }

    /// Compute positions and edges for the visible nodes.
    ///
    /// `source` is the node whose interaction caused the change; entering
    /// nodes start at its previous position and exiting nodes move to its new
    /// one. When `source` itself is hidden, its nearest visible ancestor
    /// stands in for it.
    #[instrument(level = "debug", skip(self))]
    pub fn recompute(&mut self, source: NodeKey) -> ApplicationResult<Frame> {
        let root = self.require_root()?;
        if !self.tree.contains(source) {
            return Err(DomainError::UnknownNode.into());
        }

        // Label width over the full tree keeps spacing stable across toggles
        let max_label = self.tree.max_label_len().max(1) as f64;
        let spacing = max_label * self.config.char_width;
        let level_height = max_label * self.config.level_factor;

        let visibility = &self.visibility;
        let tidy = TidyConfig {
            sibling_separation: self.config.sibling_separation,
            subtree_separation: self.config.subtree_separation,
        };
        let placed = tidy_layout(root, |k| visibility.visible_children(k), &tidy);
        let widths = traverse::level_widths(root, |k| visibility.visible_children(k));
        let max_width = widths.iter().copied().max().unwrap_or(1) as f64;
        let x_scale = spacing * (max_width / unit_span(&placed).max(1.0)).max(1.0);
        trace!(max_label, max_width, x_scale, "spacing");

        let new_positions: HashMap<NodeKey, Point> = placed
            .iter()
            .map(|t| {
                (
                    t.node,
                    Point::new(t.x * x_scale, t.depth as f64 * level_height),
                )
            })
            .collect();

        let anchor_key = self.nearest_visible(source, &new_positions);
        let anchor = new_positions[&anchor_key];
        let origin = self.positions.get(&anchor_key).copied().unwrap_or(anchor);

        let mut nodes: Vec<PlacedNode> = Vec::with_capacity(placed.len());
        let mut entering: Vec<StableId> = Vec::new();
        for t in &placed {
            let stable_id = self.assign_stable_id(t.node);
            let position = new_positions[&t.node];
            let previous = match self.positions.get(&t.node) {
                Some(p) => *p,
                None => {
                    entering.push(stable_id);
                    origin
                }
            };
            nodes.push(self.placed_node(
                t.node,
                LayoutState {
                    stable_id,
                    x: position.x,
                    y: position.y,
                    previous_x: previous.x,
                    previous_y: previous.y,
                },
            )?);
        }

        let mut edges: Vec<FrameEdge> = Vec::with_capacity(placed.len().saturating_sub(1));
        for (i, t) in placed.iter().enumerate() {
            if let Some(p) = t.parent {
                edges.push(self.edge(&nodes[p], &nodes[i]));
            }
        }

        let gone: Vec<(NodeKey, Point)> = self
            .positions
            .iter()
            .filter(|(k, _)| !new_positions.contains_key(k))
            .map(|(k, p)| (*k, *p))
            .collect();
        let exiting: Vec<ExitingNode> = gone
            .into_iter()
            .map(|(key, from)| ExitingNode {
                key,
                stable_id: self.assign_stable_id(key),
                name: self
                    .tree
                    .get(key)
                    .map(|n| n.name.clone())
                    .unwrap_or_default(),
                from,
                to: anchor,
            })
            .sorted_by_key(|e| e.stable_id)
            .collect();

        debug!(
            visible = nodes.len(),
            entering = entering.len(),
            exiting = exiting.len(),
            "recomputed layout"
        );

        self.positions = new_positions;
        Ok(Frame {
            source: self.assign_stable_id(anchor_key),
            origin,
            anchor,
            nodes,
            edges,
            entering,
            exiting,
        })
    }

    fn assign_stable_id(&mut self, key: NodeKey) -> StableId {
        if let Some(id) = self.stable_ids.get(&key) {
            return *id;
        }
        self.last_id += 1;
        self.stable_ids.insert(key, self.last_id);
        self.last_id
    }

    fn nearest_visible(&self, key: NodeKey, visible: &HashMap<NodeKey, Point>) -> NodeKey {
        let mut current = key;
        while !visible.contains_key(&current) {
            match self.tree.get(current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    fn placed_node(&self, key: NodeKey, layout: LayoutState) -> ApplicationResult<PlacedNode> {
        let node = self.tree.get(key).ok_or(DomainError::UnknownNode)?;
        let leaf = match &node.kind {
            NodeKind::Leaf {
                pass_fail_ratio,
                pass_total_ratio,
                ..
            } => {
                let ratio = if pass_total_ratio.is_nan() {
                    0.0
                } else {
                    *pass_total_ratio
                };
                Some(LeafInfo {
                    pass_fail_ratio: pass_fail_ratio.clone(),
                    pass_total_ratio: *pass_total_ratio,
                    pass_bar: PassBar {
                        passed_width: self.config.pass_bar_width * ratio,
                        failed_width: self.config.pass_bar_width * (1.0 - ratio),
                        height: self.config.pass_bar_height,
                    },
                })
            }
            NodeKind::Internal { .. } => None,
        };
        Ok(PlacedNode {
            key,
            name: node.name.clone(),
            side: node.side,
            depth: node.depth,
            state: self.visibility.state(key).unwrap_or(NodeState::Leaf),
            pass_mark: node.pass_mark(),
            leaf,
            layout,
        })
    }

    fn edge(&self, parent: &PlacedNode, child: &PlacedNode) -> FrameEdge {
        let sign = match child.side {
            Side::Left => ">",
            Side::Right | Side::Root => "<=",
        };
        let label = match parent.pass_mark {
            Some(mark) => format!("{} {}", sign, mark),
            None => sign.to_string(),
        };
        FrameEdge {
            parent: parent.layout,
            child: child.layout,
            side: child.side,
            label,
        }
    }
}
