use std::fmt;

use generational_arena::{Arena, Index};
use serde::Serialize;
use tracing::instrument;

/// Handle of a node inside a [`DisplayTree`].
pub type NodeKey = Index;

/// Which branch of its parent a node hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Root,
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Root => write!(f, "root"),
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Internal split or terminal leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Internal {
        /// Split threshold
        pass_mark: f64,
        /// `[left, right]`
        children: [NodeKey; 2],
    },
    Leaf {
        passed: u64,
        failed: u64,
        /// `"<passed> / <failed>"`
        pass_fail_ratio: String,
        /// `passed / (passed + failed)`
        pass_total_ratio: f64,
    },
}

/// Tree node in the arena-based display tree.
#[derive(Debug, Clone)]
pub struct DisplayNode {
    pub name: String,
    pub side: Side,
    /// `nodeNumber` of the record this node was built from
    pub node_number: i64,
    /// Distance from the root, root = 0
    pub depth: usize,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<NodeKey>,
    pub kind: NodeKind,
}

impl DisplayNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn children(&self) -> Option<[NodeKey; 2]> {
        match self.kind {
            NodeKind::Internal { children, .. } => Some(children),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn pass_mark(&self) -> Option<f64> {
        match self.kind {
            NodeKind::Internal { pass_mark, .. } => Some(pass_mark),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn pass_fail_ratio(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf {
                pass_fail_ratio, ..
            } => Some(pass_fail_ratio),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn pass_total_ratio(&self) -> Option<f64> {
        match self.kind {
            NodeKind::Leaf {
                pass_total_ratio, ..
            } => Some(pass_total_ratio),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Label length in characters, used for spacing.
    pub fn label_len(&self) -> usize {
        self.name.chars().count()
    }
}

impl fmt::Display for DisplayNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Internal { pass_mark, .. } => write!(f, "{} [{}]", self.name, pass_mark),
            NodeKind::Leaf {
                pass_fail_ratio, ..
            } => write!(f, "{} ({})", self.name, pass_fail_ratio),
        }
    }
}

/// Arena-based binary display tree.
///
/// Built once by [`crate::domain::TreeBuilder`] and never mutated structurally
/// afterwards; view state lives outside the tree, keyed by [`NodeKey`].
#[derive(Debug, Clone)]
pub struct DisplayTree {
    arena: Arena<DisplayNode>,
    root: Option<NodeKey>,
}

impl Default for DisplayTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
            root: None,
        }
    }

    pub(crate) fn insert(&mut self, node: DisplayNode) -> NodeKey {
        let is_root = node.parent.is_none();
        let key = self.arena.insert(node);
        if is_root {
            self.root = Some(key);
        }
        key
    }

    pub(crate) fn get_mut(&mut self, key: NodeKey) -> Option<&mut DisplayNode> {
        self.arena.get_mut(key)
    }

    pub fn get(&self, key: NodeKey) -> Option<&DisplayNode> {
        self.arena.get(key)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.arena.contains(key)
    }

    pub fn root(&self) -> Option<NodeKey> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Structural children of `key`, regardless of visibility.
    pub fn children(&self, key: NodeKey) -> Option<[NodeKey; 2]> {
        self.get(key).and_then(DisplayNode::children)
    }

    /// Pre-order iterator, left before right.
    #[instrument(level = "trace", skip(self))]
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order iterator over the subtree rooted at `key`.
    pub fn iter_from(&self, key: NodeKey) -> TreeIterator<'_> {
        TreeIterator::new(self, Some(key))
    }

    /// Number of levels, 0 for an empty tree.
    #[instrument(level = "debug", skip(self))]
    pub fn height(&self) -> usize {
        self.iter().map(|(_, n)| n.depth + 1).max().unwrap_or(0)
    }

    pub fn leaf_count(&self) -> usize {
        self.iter().filter(|(_, n)| n.is_leaf()).count()
    }

    pub fn internal_count(&self) -> usize {
        self.iter().filter(|(_, n)| !n.is_leaf()).count()
    }

    /// Longest label over the whole tree, hidden nodes included.
    #[instrument(level = "debug", skip(self))]
    pub fn max_label_len(&self) -> usize {
        self.iter().map(|(_, n)| n.label_len()).max().unwrap_or(0)
    }

    pub fn find_by_number(&self, node_number: i64) -> Option<NodeKey> {
        self.iter()
            .find(|(_, n)| n.node_number == node_number)
            .map(|(k, _)| k)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeKey> {
        self.iter().find(|(_, n)| n.name == name).map(|(k, _)| k)
    }

    /// True if `ancestor` lies strictly above `key`.
    pub fn is_descendant_of(&self, key: NodeKey, ancestor: NodeKey) -> bool {
        let mut current = self.get(key).and_then(|n| n.parent);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.get(k).and_then(|n| n.parent);
        }
        false
    }
}

pub struct TreeIterator<'a> {
    tree: &'a DisplayTree,
    stack: Vec<NodeKey>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a DisplayTree, start: Option<NodeKey>) -> Self {
        Self {
            tree,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (NodeKey, &'a DisplayNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.stack.pop() {
            if let Some(node) = self.tree.get(current) {
                // Push children in reverse order for left-to-right traversal
                if let Some([left, right]) = node.children() {
                    self.stack.push(right);
                    self.stack.push(left);
                }
                return Some((current, node));
            }
        }
        None
    }
}
