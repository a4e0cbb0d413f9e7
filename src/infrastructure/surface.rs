//! Rendering surfaces that write frames to a stream

use std::io::{self, Write};

use serde::Serialize;
use termtree::Tree;
use tracing::trace;

use crate::application::frame::{Frame, PlacedNode};
use crate::application::viewport::Transform;
use crate::application::visibility::NodeState;
use crate::infrastructure::traits::RenderSurface;

/// Text label of a node as shown in the terminal.
pub fn node_label(node: &PlacedNode) -> String {
    match (&node.leaf, node.state) {
        (Some(leaf), _) if leaf.pass_total_ratio.is_nan() => {
            format!("{} ({}, N/A)", node.name, leaf.pass_fail_ratio)
        }
        (Some(leaf), _) => format!(
            "{} ({}, {:.0}%)",
            node.name,
            leaf.pass_fail_ratio,
            leaf.pass_total_ratio * 100.0
        ),
        (None, NodeState::Collapsed) => format!("{} [+]", node.name),
        (None, _) => node.name.clone(),
    }
}

/// Rebuild the visible hierarchy of a frame as a printable tree.
pub fn frame_to_tree(frame: &Frame) -> Tree<String> {
    // Nodes are in pre-order, so depth alone is enough to rebuild nesting
    let mut stack: Vec<(usize, Tree<String>)> = Vec::new();
    for node in &frame.nodes {
        while let Some((depth, _)) = stack.last() {
            if *depth < node.depth {
                break;
            }
            fold_top(&mut stack);
        }
        stack.push((node.depth, Tree::new(node_label(node))));
    }
    while stack.len() > 1 {
        fold_top(&mut stack);
    }
    stack
        .pop()
        .map(|(_, t)| t)
        .unwrap_or_else(|| Tree::new("Empty tree".to_string()))
}

fn fold_top(stack: &mut Vec<(usize, Tree<String>)>) {
    if let Some((depth, top)) = stack.pop() {
        match stack.last_mut() {
            Some((_, parent)) => {
                parent.push(top);
            }
            None => stack.push((depth, top)),
        }
    }
}

/// Prints the visible tree after every frame.
#[derive(Debug)]
pub struct TextSurface<W: Write> {
    writer: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderSurface for TextSurface<W> {
    fn present(&mut self, frame: &Frame, _duration_ms: u64) -> io::Result<()> {
        write!(self.writer, "{}", frame_to_tree(frame))?;
        self.writer.flush()
    }

    fn center(&mut self, transform: &Transform, _duration_ms: u64) -> io::Result<()> {
        trace!(?transform, "text surface ignores viewport changes");
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Message<'a> {
    Frame {
        duration_ms: u64,
        frame: &'a Frame,
    },
    Center {
        duration_ms: u64,
        transform: &'a Transform,
    },
}

/// Streams frames and viewport changes as JSON, one message per line
/// (or pretty-printed), for an external renderer to consume.
#[derive(Debug)]
pub struct JsonFrameSurface<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonFrameSurface<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, message: &Message<'_>) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, message)?;
        } else {
            serde_json::to_writer(&mut self.writer, message)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()
    }
}

impl<W: Write> RenderSurface for JsonFrameSurface<W> {
    fn present(&mut self, frame: &Frame, duration_ms: u64) -> io::Result<()> {
        self.emit(&Message::Frame { duration_ms, frame })
    }

    fn center(&mut self, transform: &Transform, duration_ms: u64) -> io::Result<()> {
        self.emit(&Message::Center {
            duration_ms,
            transform,
        })
    }
}
