//! Pan/zoom model of the drawing area.

use serde::{Deserialize, Serialize};

/// A point in layout or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// `translate(tx, ty) scale(s)` applied to the layout group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub translate: Point,
    pub scale: f64,
}

/// Viewport dimensions and zoom limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            min_scale: 0.1,
            max_scale: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    config: ViewportConfig,
    translate: Point,
    scale: f64,
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            translate: Point::default(),
            scale: 1.0,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translate: self.translate,
            scale: self.scale,
        }
    }

    /// Apply a zoom/pan gesture; the scale is clamped to the configured range.
    pub fn zoom(&mut self, scale: f64, translate: Point) -> Transform {
        self.scale = scale.clamp(self.config.min_scale, self.config.max_scale);
        self.translate = translate;
        self.transform()
    }

    /// Pan so that `point` (layout space) sits in the middle of the viewport.
    /// The current scale is kept.
    pub fn center_on(&mut self, point: Point) -> Transform {
        self.translate = Point::new(
            -point.x * self.scale + self.config.width / 2.0,
            -point.y * self.scale + self.config.height / 2.0,
        );
        self.transform()
    }

    /// Map a layout-space point to screen space.
    pub fn to_screen(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.translate.x,
            point.y * self.scale + self.translate.y,
        )
    }
}
