//! Input Capture and Normalization
//!
//! Directional axes sampled from the host once per tick. Axes are
//! sanitized on construction so the turn model never sees NaN or values
//! outside [-1, 1].

use serde::{Deserialize, Serialize};
use crate::core::math::sanitize_axis;

/// Raw input state for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Steering axis: -1 (left) to +1 (right)
    pub horizontal: f32,
    /// Lean axis: -1 (brake) to +1 (tuck)
    pub vertical: f32,
    /// Boost button went down this tick
    pub boost: bool,
}

impl InputFrame {
    /// Create an idle frame.
    pub const fn new() -> Self {
        Self { horizontal: 0.0, vertical: 0.0, boost: false }
    }

    /// Create a frame from raw axis values.
    pub fn with_axes(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal: sanitize_axis(horizontal),
            vertical: sanitize_axis(vertical),
            boost: false,
        }
    }

    /// Same frame with the boost edge set.
    pub fn with_boost(mut self) -> Self {
        self.boost = true;
        self
    }

    /// Re-apply axis sanitization (for frames built with struct literals
    /// or deserialized from a recording).
    pub fn sanitized(self) -> Self {
        Self {
            horizontal: sanitize_axis(self.horizontal),
            vertical: sanitize_axis(self.vertical),
            boost: self.boost,
        }
    }
}
