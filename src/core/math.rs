//! Scalar Helpers
//!
//! Small float helpers shared by the turn model, the motion controller and
//! the timed effects. Every helper is total: non-finite inputs collapse to a
//! well-defined value instead of propagating NaN into the simulation.

// =============================================================================
// GAME CONSTANTS
// =============================================================================

/// Heading (degrees) the skier faces when no turn is applied.
///
/// The character starts rotated half a turn, so "straight down the slope"
/// is 180 rather than 0.
pub const NEUTRAL_HEADING: f32 = 180.0;

/// Tolerance used when comparing simulated floats in tests and asserts.
pub const EPSILON: f32 = 1.0e-4;

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Replace a non-finite value with `fallback`.
#[inline]
pub fn sanitize(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

/// Clamp a value to `[min, max]`. NaN maps to `min`.
#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Clamp to the unit interval.
#[inline]
pub fn clamp01(value: f32) -> f32 {
    clamp(value, 0.0, 1.0)
}

/// Linear interpolation: a + (b - a) * t, with t clamped to [0, 1].
///
/// Matches the host engine's interpolation: overshooting `t` saturates at the
/// endpoints instead of extrapolating.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

/// Sanitize a timestep. Non-finite or negative values become zero.
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
}

/// Sanitize an input axis to [-1, 1]. NaN becomes zero.
#[inline]
pub fn sanitize_axis(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(-1.0).min(1.0)
}

/// Approximate float equality within [`EPSILON`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON
}

// =============================================================================
// TESTS
// =============================================================================
