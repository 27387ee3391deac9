//! Centreline snapping for drag gestures.

use serde::{Deserialize, Serialize};

use crate::geometry::{Position, CENTRE};

/// Default snap distance in percentage points.
pub const DEFAULT_SNAP_THRESHOLD: f32 = 2.0;

/// Active alignment guides.
///
/// A snapped `x` shows the vertical centreline; a snapped `y` shows the
/// horizontal one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapGuides {
    /// Vertical guide at `x = 50%`.
    pub vertical: bool,
    /// Horizontal guide at `y = 50%`.
    pub horizontal: bool,
}

impl SnapGuides {
    /// Whether any guide is shown.
    #[must_use]
    pub fn any(&self) -> bool {
        self.vertical || self.horizontal
    }
}

/// Outcome of snapping a proposed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// Position after snapping.
    pub position: Position,
    /// Guides to display.
    pub guides: SnapGuides,
}

/// Snaps each axis independently to the canvas centreline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapEngine {
    threshold: f32,
    centre: f32,
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SNAP_THRESHOLD)
    }
}

impl SnapEngine {
    /// Create an engine snapping within `threshold` points of the centre.
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self::with_centre(threshold, CENTRE)
    }

    /// Create an engine with a custom centreline.
    #[must_use]
    pub fn with_centre(threshold: f32, centre: f32) -> Self {
        Self {
            threshold: threshold.max(0.0),
            centre,
        }
    }

    /// The snap threshold.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Snap a proposed drag position.
    #[must_use]
    pub fn snap(&self, proposed: Position) -> SnapResult {
        let (x, vertical) = self.snap_axis(proposed.x);
        let (y, horizontal) = self.snap_axis(proposed.y);
        SnapResult {
            position: Position::new(x, y),
            guides: SnapGuides {
                vertical,
                horizontal,
            },
        }
    }

    fn snap_axis(&self, value: f32) -> (f32, bool) {
        if (value - self.centre).abs() < self.threshold {
            (self.centre, true)
        } else {
            (value, false)
        }
    }
}
