//! dectree: collapsible decision-tree layout engine.
//!
//! Node records are turned into an immutable [`domain::DisplayTree`] by the
//! [`domain::TreeBuilder`]; an [`application::LayoutController`] keeps the
//! expand/collapse state and produces [`application::Frame`]s for a
//! rendering surface.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
