//! Generic depth-first traversal parameterized by a children accessor.
//!
//! The accessor decides which edges are followed, so the same walk serves the
//! full tree, the currently visible part of it, or any other projection.

/// Pre-order walk from `root`, calling `visit_fn(node, depth)` for every node
/// reached through `children_fn`. Children are visited in the order returned.
pub fn visit<N, C, I, V>(root: N, mut children_fn: C, mut visit_fn: V)
where
    N: Copy,
    C: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
    V: FnMut(N, usize),
{
    let mut stack = vec![(root, 0usize)];
    let mut buf: Vec<N> = Vec::new();

    while let Some((node, depth)) = stack.pop() {
        visit_fn(node, depth);
        buf.clear();
        buf.extend(children_fn(node));
        // Push in reverse order for left-to-right traversal
        stack.extend(buf.drain(..).rev().map(|child| (child, depth + 1)));
    }
}

/// Pre-order list of `(node, depth)` pairs.
pub fn collect<N, C, I>(root: N, children_fn: C) -> Vec<(N, usize)>
where
    N: Copy,
    C: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut out = Vec::new();
    visit(root, children_fn, |n, d| out.push((n, d)));
    out
}

/// Number of nodes at each depth.
pub fn level_widths<N, C, I>(root: N, children_fn: C) -> Vec<usize>
where
    N: Copy,
    C: FnMut(N) -> I,
    I: IntoIterator<Item = N>,
{
    let mut widths: Vec<usize> = Vec::new();
    visit(root, children_fn, |_, depth| {
        if widths.len() <= depth {
            widths.resize(depth + 1, 0);
        }
        widths[depth] += 1;
    });
    widths
}
