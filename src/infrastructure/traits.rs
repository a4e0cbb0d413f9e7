//! I/O boundary traits for testability
//!
//! These traits abstract the data source and the rendering collaborator,
//! allowing the controller to be driven with in-memory implementations.

use std::io;

use crate::application::frame::Frame;
use crate::application::viewport::Transform;
use crate::domain::RawNodeRecord;
use crate::infrastructure::InfraResult;

/// One-shot source of raw node records.
pub trait RecordSource {
    /// Load the whole collection. No partial or streaming load.
    fn load(&self) -> InfraResult<Vec<RawNodeRecord>>;

    /// Human-readable origin, used in error messages.
    fn describe(&self) -> String;
}

/// Rendering collaborator that draws frames.
///
/// Implementations animate persisting nodes from `previous_*` to the current
/// position, entering nodes out of `frame.origin` and exiting nodes towards
/// their `to` point. A newer frame supersedes any running transition.
pub trait RenderSurface {
    /// Draw a freshly computed frame.
    fn present(&mut self, frame: &Frame, duration_ms: u64) -> io::Result<()>;

    /// Move the view to `transform`.
    fn center(&mut self, transform: &Transform, duration_ms: u64) -> io::Result<()>;
}

impl<S: RenderSurface + ?Sized> RenderSurface for Box<S> {
    fn present(&mut self, frame: &Frame, duration_ms: u64) -> io::Result<()> {
        (**self).present(frame, duration_ms)
    }

    fn center(&mut self, transform: &Transform, duration_ms: u64) -> io::Result<()> {
        (**self).center(transform, duration_ms)
    }
}

/// Surface that keeps everything it is given, for tests and embedding.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub frames: Vec<Frame>,
    pub transforms: Vec<Transform>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn last_transform(&self) -> Option<&Transform> {
        self.transforms.last()
    }
}

impl RenderSurface for RecordingSurface {
    fn present(&mut self, frame: &Frame, _duration_ms: u64) -> io::Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn center(&mut self, transform: &Transform, _duration_ms: u64) -> io::Result<()> {
        self.transforms.push(*transform);
        Ok(())
    }
}
