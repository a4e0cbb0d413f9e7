//! Domain layer: records, display tree and layout algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod error;
pub mod layout;
pub mod record;
pub mod traverse;
pub mod tree;

pub use builder::{EmptyLeafPolicy, TreeBuilder, DEFAULT_ROOT_ID};
pub use error::{DomainError, DomainResult};
pub use layout::{tidy_layout, unit_span, TidyConfig, TidyNode};
pub use record::{RawNodeRecord, RecordShape};
pub use tree::{DisplayNode, DisplayTree, NodeKey, NodeKind, Side};
