//! Percentage-space geometry shared by every layer type.
//!
//! Layer positions and sizes are stored as percentages of the canvas
//! dimensions. The canvas width is always 1080 units; its height depends on
//! the chosen [`CanvasSize`]. Positions describe the **centre** of a layer.

use serde::{Deserialize, Serialize};

/// Canvas width in canvas units, identical for every aspect ratio.
pub const CANVAS_WIDTH: f32 = 1080.0;

/// Coordinate of the canvas centreline on either axis, in percent.
pub const CENTRE: f32 = 50.0;

/// Supported canvas aspect ratios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanvasSize {
    /// 4:5 feed post, 1080 × 1350.
    #[default]
    #[serde(rename = "4:5", alias = "portrait")]
    Portrait,
    /// 9:16 story, 1080 × 1920.
    #[serde(rename = "9:16", alias = "story")]
    Story,
    /// 1:1 square, 1080 × 1080.
    #[serde(rename = "1:1", alias = "square")]
    Square,
}

impl CanvasSize {
    /// Pixel dimensions of this canvas size.
    #[must_use]
    pub const fn dimensions(self) -> Dimensions {
        let height = match self {
            Self::Portrait => 1350.0,
            Self::Story => 1920.0,
            Self::Square => 1080.0,
        };
        Dimensions {
            width: CANVAS_WIDTH,
            height,
        }
    }

    /// Human-readable ratio label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Portrait => "4:5",
            Self::Story => "9:16",
            Self::Square => "1:1",
        }
    }
}

/// Width and height in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in canvas units.
    pub width: f32,
    /// Height in canvas units.
    pub height: f32,
}

impl Dimensions {
    /// Convert a point in canvas units into percentage space.
    #[must_use]
    pub fn to_percent(self, x: f32, y: f32) -> Position {
        Position {
            x: percent_of(x, self.width),
            y: percent_of(y, self.height),
        }
    }

    /// Convert a percentage-space point into canvas units.
    #[must_use]
    pub fn to_pixels(self, position: Position) -> (f32, f32) {
        (
            percent_to_pixels(position.x, self.width),
            percent_to_pixels(position.y, self.height),
        )
    }

    /// Whether a point in canvas units lies on the canvas surface.
    #[must_use]
    pub fn contains(self, x: f32, y: f32) -> bool {
        x >= 0.0 && x <= self.width && y >= 0.0 && y <= self.height
    }
}

/// Convert a percentage of `dimension` into canvas units.
#[must_use]
pub fn percent_to_pixels(percent: f32, dimension: f32) -> f32 {
    percent / 100.0 * dimension
}

/// Express `pixels` as a percentage of `dimension`.
///
/// A zero or non-finite dimension yields 0 rather than propagating NaN.
#[must_use]
pub fn percent_of(pixels: f32, dimension: f32) -> f32 {
    if dimension == 0.0 || !dimension.is_finite() {
        return 0.0;
    }
    finite_or(pixels / dimension * 100.0, 0.0)
}

/// Return `value` if it is finite, otherwise `fallback`.
#[must_use]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// A centre-anchored position in percentage space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal centre, percent of canvas width.
    #[serde(default = "Position::centre_axis")]
    pub x: f32,
    /// Vertical centre, percent of canvas height.
    #[serde(default = "Position::centre_axis")]
    pub y: f32,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The canvas centre.
    #[must_use]
    pub const fn centre() -> Self {
        Self::new(CENTRE, CENTRE)
    }

    const fn centre_axis() -> f32 {
        CENTRE
    }

    /// Replace non-finite components with the canvas centre.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            x: finite_or(self.x, CENTRE),
            y: finite_or(self.y, CENTRE),
        }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn offset_from(self, other: Self) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }

    /// Translate by `(dx, dy)`.
    #[must_use]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::centre()
    }
}

/// An axis-aligned rectangle in canvas units (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Build a rectangle from its centre point and extent.
    #[must_use]
    pub fn from_centre(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Centre point of the rectangle.
    #[must_use]
    pub fn centre(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the rectangle contains a point.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Grow the rectangle by `amount` on every side.
    #[must_use]
    pub fn inflate(&self, amount: f32) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }

    /// Whether a point lies inside the rectangle after rotating it by
    /// `degrees` about its centre.
    #[must_use]
    pub fn contains_rotated(&self, x: f32, y: f32, degrees: f32) -> bool {
        if degrees == 0.0 || !degrees.is_finite() {
            return self.contains(x, y);
        }
        let (cx, cy) = self.centre();
        let (sin, cos) = (-degrees.to_radians()).sin_cos();
        let (dx, dy) = (x - cx, y - cy);
        let local_x = dx * cos - dy * sin + cx;
        let local_y = dx * sin + dy * cos + cy;
        self.contains(local_x, local_y)
    }
}
