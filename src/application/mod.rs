//! Application layer: view state and the layout controller
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod controller;
pub mod error;
pub mod error_ext;
pub mod frame;
pub mod viewport;
pub mod visibility;

pub use controller::{LayoutController, DEFAULT_TRANSITION_MS};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use frame::{
    ExitingNode, Frame, FrameEdge, LayoutConfig, LayoutState, LeafInfo, PassBar, PlacedNode,
    StableId,
};
pub use viewport::{Point, Transform, Viewport, ViewportConfig};
pub use visibility::{NodeState, VisibilityMap, VisibilityState};
