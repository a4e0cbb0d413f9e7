//! Reingold-Tilford tidy tree layout.
//!
//! Produces an abstract `(x, depth)` placement in unit coordinates: direct
//! siblings sit at least `sibling_separation` apart, any other neighbours on a
//! level at least `subtree_separation`. Parents are centered over their first
//! and last child and the root lands on `x = 0`.
//!
//! # Algorithm
//!
//! 1. **Flatten (pre-order):** walk the tree through the children accessor
//!    and record depth and child lists.
//! 2. **Contours (post-order):** for every subtree keep its left and right
//!    outline per level, relative to the subtree root. Child subtrees are
//!    pushed right until their left outline clears the accumulated right
//!    outline of the siblings before them.
//! 3. **Absolute x (pre-order):** accumulate the relative child offsets.
//!
//! Both passes use explicit stacks or index order, never recursion, so the
//! height of the tree is not limited by the call stack.

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Separation settings for the tidy layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TidyConfig {
    /// Minimum distance between children of the same parent
    pub sibling_separation: f64,
    /// Minimum distance between neighbouring nodes with different parents
    pub subtree_separation: f64,
}

impl Default for TidyConfig {
    fn default() -> Self {
        Self {
            sibling_separation: 1.0,
            subtree_separation: 2.0,
        }
    }
}

/// One placed node, in pre-order.
#[derive(Debug, Clone, PartialEq)]
pub struct TidyNode<N> {
    pub node: N,
    pub depth: usize,
    /// Position of the parent in the output vector
    pub parent: Option<usize>,
    /// Horizontal position in units, root = 0
    pub x: f64,
}

struct FlatNode<N> {
    node: N,
    depth: usize,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Lay out the tree reachable from `root` through `children_fn`.
#[instrument(level = "debug", skip_all)]
pub fn tidy_layout<N, C, I>(root: N, mut children_fn: C, config: &TidyConfig) -> Vec<TidyNode<N>>
where
    N: Copy,
    C: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
{
    let flat = flatten(root, &mut children_fn);
    let offsets = relative_offsets(&flat, config);

    // Pre-order guarantees parents come before their children
    let mut out: Vec<TidyNode<N>> = Vec::with_capacity(flat.len());
    for (i, f) in flat.iter().enumerate() {
        let x = match f.parent {
            Some(p) => out[p].x + offsets[i],
            None => 0.0,
        };
        out.push(TidyNode {
            node: f.node,
            depth: f.depth,
            parent: f.parent,
            x,
        });
    }
    trace!(nodes = out.len(), "tidy layout done");
    out
}

/// Distance between the leftmost and rightmost placed node.
pub fn unit_span<N>(nodes: &[TidyNode<N>]) -> f64 {
    let (min, max) = nodes
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), n| {
            (lo.min(n.x), hi.max(n.x))
        });
    if min.is_finite() && max.is_finite() {
        max - min
    } else {
        0.0
    }
}

fn flatten<N, C, I>(root: N, children_fn: &mut C) -> Vec<FlatNode<N>>
where
    N: Copy,
    C: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut flat: Vec<FlatNode<N>> = Vec::new();
    let mut stack: Vec<(N, usize, Option<usize>)> = vec![(root, 0, None)];
    let mut buf: Vec<N> = Vec::new();

    while let Some((node, depth, parent)) = stack.pop() {
        let idx = flat.len();
        flat.push(FlatNode {
            node,
            depth,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            flat[p].children.push(idx);
        }
        buf.clear();
        buf.extend(children_fn(node));
        stack.extend(buf.drain(..).rev().map(|c| (c, depth + 1, Some(idx))));
    }
    flat
}

/// Offset of every node relative to its parent.
fn relative_offsets<N>(flat: &[FlatNode<N>], config: &TidyConfig) -> Vec<f64> {
    let n = flat.len();
    let mut offsets = vec![0.0; n];
    let mut left: Vec<Vec<f64>> = vec![Vec::new(); n];
    let mut right: Vec<Vec<f64>> = vec![Vec::new(); n];

    // Reverse pre-order visits children before their parent
    for i in (0..n).rev() {
        let children = &flat[i].children;
        if children.is_empty() {
            left[i] = vec![0.0];
            right[i] = vec![0.0];
            continue;
        }

        let first = children[0];
        let mut acc_left = std::mem::take(&mut left[first]);
        let mut acc_right = std::mem::take(&mut right[first]);
        offsets[first] = 0.0;

        for &child in &children[1..] {
            let child_left = std::mem::take(&mut left[child]);
            let child_right = std::mem::take(&mut right[child]);

            let mut shift = f64::NEG_INFINITY;
            for (d, (&r, &l)) in acc_right.iter().zip(child_left.iter()).enumerate() {
                let sep = if d == 0 {
                    config.sibling_separation
                } else {
                    config.subtree_separation
                };
                shift = shift.max(r - l + sep);
            }
            offsets[child] = shift;

            for (d, &r) in child_right.iter().enumerate() {
                if d < acc_right.len() {
                    acc_right[d] = r + shift;
                } else {
                    acc_right.push(r + shift);
                }
            }
            for &l in child_left.iter().skip(acc_left.len()) {
                acc_left.push(l + shift);
            }
        }

        let last = children[children.len() - 1];
        let mid = (offsets[first] + offsets[last]) / 2.0;
        for &child in children {
            offsets[child] -= mid;
        }

        let mut l = Vec::with_capacity(acc_left.len() + 1);
        l.push(0.0);
        l.extend(acc_left.into_iter().map(|v| v - mid));
        let mut r = Vec::with_capacity(acc_right.len() + 1);
        r.push(0.0);
        r.extend(acc_right.into_iter().map(|v| v - mid));
        left[i] = l;
        right[i] = r;
    }
    offsets
}
