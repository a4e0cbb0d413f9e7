//! Expand/collapse state, kept apart from the immutable display tree.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{DisplayTree, NodeKey};

/// Observable state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    /// Children are visible
    Expanded,
    /// Children are hidden, their own states frozen
    Collapsed,
    /// No children at all
    Leaf,
}

/// Per-node visibility record. At most one side holds the child pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VisibilityState {
    pub visible_children: Option<[NodeKey; 2]>,
    pub hidden_children: Option<[NodeKey; 2]>,
}

impl VisibilityState {
    /// Expanded state for a node with `children`, empty state for a leaf.
    pub fn expanded(children: Option<[NodeKey; 2]>) -> Self {
        Self {
            visible_children: children,
            hidden_children: None,
        }
    }

    pub fn state(&self) -> NodeState {
        match (self.visible_children, self.hidden_children) {
            (Some(_), _) => NodeState::Expanded,
            (None, Some(_)) => NodeState::Collapsed,
            (None, None) => NodeState::Leaf,
        }
    }

    /// Move the child pair to the other side. No-op for leaves.
    pub fn toggle(&mut self) {
        std::mem::swap(&mut self.visible_children, &mut self.hidden_children);
    }

    pub fn collapse(&mut self) {
        if self.visible_children.is_some() {
            self.toggle();
        }
    }

    pub fn expand(&mut self) {
        if self.hidden_children.is_some() {
            self.toggle();
        }
    }
}

/// Visibility records for every node of one tree.
#[derive(Debug, Clone, Default)]
pub struct VisibilityMap {
    states: HashMap<NodeKey, VisibilityState>,
}

impl VisibilityMap {
    /// Fully expanded state for `tree`.
    pub fn fully_expanded(tree: &DisplayTree) -> Self {
        let states = tree
            .iter()
            .map(|(key, node)| (key, VisibilityState::expanded(node.children())))
            .collect();
        Self { states }
    }

    pub fn get(&self, key: NodeKey) -> Option<&VisibilityState> {
        self.states.get(&key)
    }

    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut VisibilityState> {
        self.states.get_mut(&key)
    }

    pub fn state(&self, key: NodeKey) -> Option<NodeState> {
        self.get(key).map(VisibilityState::state)
    }

    /// Children currently shown below `key`; empty when collapsed or a leaf.
    pub fn visible_children(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> {
        self.get(key)
            .and_then(|s| s.visible_children)
            .into_iter()
            .flatten()
    }

    /// Set every internal node of the subtree at `from` to collapsed.
    pub fn collapse_all(&mut self, tree: &DisplayTree, from: NodeKey) {
        for (key, _) in tree.iter_from(from) {
            if let Some(state) = self.states.get_mut(&key) {
                state.collapse();
            }
        }
    }

    /// Set every internal node of the subtree at `from` to expanded.
    pub fn expand_all(&mut self, tree: &DisplayTree, from: NodeKey) {
        for (key, _) in tree.iter_from(from) {
            if let Some(state) = self.states.get_mut(&key) {
                state.expand();
            }
        }
    }
}
