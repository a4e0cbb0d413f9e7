//! Tree builder: turns the flat record collection into a display tree.

use std::collections::{HashMap, HashSet};

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::{RawNodeRecord, RecordShape};
use crate::domain::tree::{DisplayNode, DisplayTree, NodeKey, NodeKind, Side};

/// Root node number used when none is configured.
pub const DEFAULT_ROOT_ID: i64 = 1;

/// What to do with a leaf that has `passed + failed == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyLeafPolicy {
    /// Report a pass ratio of 0.0
    #[default]
    Zero,
    /// Report NaN and let the renderer show "N/A"
    NotANumber,
    /// Fail with [`DomainError::DivisionByZero`]
    Reject,
}

/// Constructs display trees from raw node records.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    empty_leaf: EmptyLeafPolicy,
}

struct PendingNode {
    number: i64,
    side: Side,
    depth: usize,
    /// Parent key and the child slot (0 = left, 1 = right) to patch
    parent: Option<(NodeKey, usize)>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_empty_leaf_policy(mut self, policy: EmptyLeafPolicy) -> Self {
        self.empty_leaf = policy;
        self
    }

    /// Build the display tree rooted at `root_id`.
    ///
    /// Works with an explicit stack, so tree height is bounded by memory only.
    /// Fails with [`DomainError::NodeNotFound`] on a missing root or a dangling
    /// child reference; no partial tree is returned.
    #[instrument(level = "debug", skip(self, records), fields(records = records.len()))]
    pub fn build(&self, records: &[RawNodeRecord], root_id: i64) -> DomainResult<DisplayTree> {
        let index = Self::index_records(records)?;
        let mut tree = DisplayTree::with_capacity(records.len());
        let mut placed: HashSet<i64> = HashSet::new();
        let mut stack = vec![PendingNode {
            number: root_id,
            side: Side::Root,
            depth: 0,
            parent: None,
        }];

        while let Some(pending) = stack.pop() {
            let record = index
                .get(&pending.number)
                .ok_or(DomainError::NodeNotFound(pending.number))?;
            if !placed.insert(pending.number) {
                return Err(DomainError::CycleDetected(pending.number));
            }
            trace!(node = pending.number, depth = pending.depth, "placing node");

            let (kind, children) = match record.shape()? {
                RecordShape::Internal {
                    left,
                    right,
                    pass_mark,
                } => {
                    // Slots are patched once the children are placed
                    let unplaced = Index::from_raw_parts(usize::MAX, u64::MAX);
                    let kind = NodeKind::Internal {
                        pass_mark,
                        children: [unplaced, unplaced],
                    };
                    (kind, Some((left, right)))
                }
                RecordShape::Leaf { passed, failed } => {
                    (self.leaf_kind(record.node_number, passed, failed)?, None)
                }
            };

            let key = tree.insert(DisplayNode {
                name: record.title.clone(),
                side: pending.side,
                node_number: record.node_number,
                depth: pending.depth,
                parent: pending.parent.map(|(p, _)| p),
                kind,
            });

            if let Some((parent, slot)) = pending.parent {
                if let Some(NodeKind::Internal { children, .. }) =
                    tree.get_mut(parent).map(|n| &mut n.kind)
                {
                    children[slot] = key;
                }
            }

            if let Some((left, right)) = children {
                // Right first so the left subtree is placed first
                stack.push(PendingNode {
                    number: right,
                    side: Side::Right,
                    depth: pending.depth + 1,
                    parent: Some((key, 1)),
                });
                stack.push(PendingNode {
                    number: left,
                    side: Side::Left,
                    depth: pending.depth + 1,
                    parent: Some((key, 0)),
                });
            }
        }

        debug!(nodes = tree.len(), "display tree built");
        Ok(tree)
    }

    fn index_records(records: &[RawNodeRecord]) -> DomainResult<HashMap<i64, &RawNodeRecord>> {
        let mut index = HashMap::with_capacity(records.len());
        for record in records {
            if index.insert(record.node_number, record).is_some() {
                return Err(DomainError::DuplicateNode(record.node_number));
            }
        }
        Ok(index)
    }

    fn leaf_kind(&self, node: i64, passed: u64, failed: u64) -> DomainResult<NodeKind> {
        let total = passed
            .checked_add(failed)
            .ok_or_else(|| DomainError::MalformedRecord {
                node,
                reason: "passed + failed overflows".to_string(),
            })?;
        let pass_total_ratio = if total == 0 {
            match self.empty_leaf {
                EmptyLeafPolicy::Zero => 0.0,
                EmptyLeafPolicy::NotANumber => f64::NAN,
                EmptyLeafPolicy::Reject => return Err(DomainError::DivisionByZero { node }),
            }
        } else {
            passed as f64 / total as f64
        };
        Ok(NodeKind::Leaf {
            passed,
            failed,
            pass_fail_ratio: format!("{} / {}", passed, failed),
            pass_total_ratio,
        })
    }
}
