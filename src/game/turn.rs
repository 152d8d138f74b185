//! Turn Model
//!
//! Maps the two steering axes to a target heading, eases the current
//! heading toward it while grounded, and derives forward speed from how far
//! the skier is turned across the slope.
//!
//! ```text
//!          180 - max      180      180 + max
//!   speed:     0  ───────  full ───────  0
//! ```

use crate::core::math::{clamp, lerp, sanitize, sanitize_axis, sanitize_dt, NEUTRAL_HEADING};
use crate::game::config::SkierConfig;

/// Result of one turn-model step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnOutput {
    /// Heading after this step (degrees)
    pub heading: f32,
    /// Forward speed implied by the heading
    pub speed: f32,
}

/// Heading and speed computation from directional input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnModel {
    /// Heading interpolation rate (per second)
    pub turn_speed: f32,
    /// Max deviation from neutral (degrees)
    pub max_turn_angle: f32,
    /// Deviation when braking and steering together (degrees)
    pub diagonal_turn_angle: f32,
}

impl TurnModel {
    /// Build from controller config.
    pub fn from_config(config: &SkierConfig) -> Self {
        Self {
            turn_speed: config.turn_speed,
            max_turn_angle: config.max_turn_angle,
            diagonal_turn_angle: config.diagonal_turn_angle,
        }
    }

    /// Lowest reachable heading.
    #[inline]
    pub fn min_heading(&self) -> f32 {
        NEUTRAL_HEADING - self.max_turn_angle
    }

    /// Highest reachable heading.
    #[inline]
    pub fn max_heading(&self) -> f32 {
        NEUTRAL_HEADING + self.max_turn_angle
    }

    /// Turn offset requested by the axes.
    ///
    /// Braking while steering gives the diagonal angle, steering alone gives
    /// the full angle, anything else (including steering while tucking)
    /// holds neutral. The sign follows `horizontal`.
    pub fn turn_input(&self, horizontal: f32, vertical: f32) -> f32 {
        let horizontal = sanitize_axis(horizontal);
        let vertical = sanitize_axis(vertical);

        if horizontal == 0.0 {
            return 0.0;
        }
        let angle = if vertical < 0.0 {
            self.diagonal_turn_angle
        } else if vertical == 0.0 {
            self.max_turn_angle
        } else {
            return 0.0;
        };
        if horizontal > 0.0 { angle } else { -angle }
    }

    /// Target heading for the given axes.
    #[inline]
    pub fn desired_heading(&self, horizontal: f32, vertical: f32) -> f32 {
        NEUTRAL_HEADING + self.turn_input(horizontal, vertical)
    }

    /// Advance `heading` one step toward the desired heading.
    ///
    /// Airborne skiers keep their heading unchanged.
    pub fn next_heading(
        &self,
        heading: f32,
        horizontal: f32,
        vertical: f32,
        grounded: bool,
        dt: f32,
    ) -> f32 {
        let heading = sanitize(heading, NEUTRAL_HEADING);
        if !grounded {
            return heading;
        }

        let desired = self.desired_heading(horizontal, vertical);
        let eased = lerp(heading, desired, sanitize_dt(dt) * self.turn_speed);
        clamp(eased, self.min_heading(), self.max_heading())
    }

    /// Forward speed at `heading` for a given base speed.
    ///
    /// Full `movement_speed` when facing neutral, zero at max turn.
    pub fn effective_speed(&self, heading: f32, movement_speed: f32) -> f32 {
        let deviation = if self.max_turn_angle > 0.0 {
            (sanitize(heading, NEUTRAL_HEADING) - NEUTRAL_HEADING).abs() / self.max_turn_angle
        } else {
            0.0
        };
        lerp(movement_speed.max(0.0), 0.0, deviation).max(0.0)
    }

    /// One full step: new heading plus the speed it implies.
    pub fn update(
        &self,
        heading: f32,
        horizontal: f32,
        vertical: f32,
        grounded: bool,
        dt: f32,
        movement_speed: f32,
    ) -> TurnOutput {
        let heading = self.next_heading(heading, horizontal, vertical, grounded, dt);
        TurnOutput {
            heading,
            speed: self.effective_speed(heading, movement_speed),
        }
    }
}

impl Default for TurnModel {
    fn default() -> Self {
        Self::from_config(&SkierConfig::default())
    }
}
