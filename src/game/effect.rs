//! Timed Effects
//!
//! Countdown-based temporary modifiers (boost, slowdown, knockback).
//! An effect is advanced once per tick by its owner; there are no
//! suspended continuations, expiry is observed as the return value of
//! [`TimedEffect::tick`].
//!
//! Elapsed time accumulates in `f64` and expiry tolerates a small fraction
//! of a step, so a duration that is a whole number of fixed steps expires on
//! exactly that tick.

use serde::{Deserialize, Serialize};
use crate::core::math::{clamp01, sanitize_dt};
use crate::core::hash::StateHasher;

/// Fraction of a step treated as "already there" when checking expiry.
const EXPIRY_SLACK: f64 = 1e-3;

/// A modifier with a finite, self-expiring duration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    /// Is the effect running?
    pub active: bool,
    /// Time since `start` (seconds)
    pub elapsed: f64,
    /// Total length (seconds)
    pub duration: f32,
    /// Effect-specific strength (multiplier, factor, ...)
    pub magnitude: f32,
}

impl TimedEffect {
    /// An inactive effect.
    pub const fn new() -> Self {
        Self { active: false, elapsed: 0.0, duration: 0.0, magnitude: 0.0 }
    }

    /// (Re)start the effect. Restarting a running effect resets its clock.
    pub fn start(&mut self, duration: f32, magnitude: f32) {
        self.active = true;
        self.elapsed = 0.0;
        self.duration = sanitize_dt(duration);
        self.magnitude = magnitude;
    }

    /// Advance by `dt`. Returns `true` on the tick the effect expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }

        let dt = f64::from(sanitize_dt(dt));
        self.elapsed += dt;
        if self.elapsed + dt * EXPIRY_SLACK >= f64::from(self.duration) {
            self.active = false;
            self.elapsed = 0.0;
            return true;
        }
        false
    }

    /// Fraction of the duration elapsed, in [0, 1].
    ///
    /// A zero-length effect reports 1.0 (already complete).
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        clamp01((self.elapsed / f64::from(self.duration)) as f32)
    }

    /// Hash this effect's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_bool(self.active);
        hasher.update_f64(self.elapsed);
        hasher.update_f32(self.duration);
        hasher.update_f32(self.magnitude);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_start_resets_clock() {
        let mut effect = TimedEffect::new();
        effect.start(3.0, 2.0);
        effect.tick(1.0);
        assert_eq!(effect.elapsed, 1.0);

        effect.start(3.0, 0.5);
        assert!(effect.active);
        assert_eq!(effect.elapsed, 0.0);
        assert_eq!(effect.magnitude, 0.5);
    }

    #[test]
    fn test_expires_exactly_at_duration() {
        let mut effect = TimedEffect::new();
        effect.start(1.5, 0.0);

        assert!(!effect.tick(0.5));
        assert!(!effect.tick(0.5));
        assert!(effect.active);
        assert!(effect.tick(0.5));

        assert!(!effect.active);
        assert_eq!(effect.elapsed, 0.0);
        // Already expired: further ticks report nothing
        assert!(!effect.tick(0.5));
    }

    #[test]
    fn test_progress() {
        let mut effect = TimedEffect::new();
        effect.start(2.0, 1.0);
        assert_eq!(effect.progress(), 0.0);
        effect.tick(0.5);
        assert_eq!(effect.progress(), 0.25);
    }

    #[test]
    fn test_fixed_step_expires_on_exact_tick() {
        // 0.02 is not exact in binary; 3.0 s must still be 150 ticks
        for (duration, ticks) in [(3.0, 150), (1.5, 75), (0.1, 5)] {
            let mut effect = TimedEffect::new();
            effect.start(duration, 1.0);

            for _ in 1..ticks {
                assert!(!effect.tick(0.02));
            }
            assert!(effect.tick(0.02), "{duration}s should expire on tick {ticks}");
        }
    }

    #[test]
    fn test_odd_step_does_not_expire_early() {
        // 1.0 / 0.3 = 3.33 ticks: expires on the 4th
        let mut effect = TimedEffect::new();
        effect.start(1.0, 1.0);
        assert!(!effect.tick(0.3));
        assert!(!effect.tick(0.3));
        assert!(!effect.tick(0.3));
        assert!(effect.tick(0.3));
    }

    #[test]
    fn test_zero_duration_expires_on_first_tick() {
        let mut effect = TimedEffect::new();
        effect.start(0.0, 1.0);
        assert_eq!(effect.progress(), 1.0);
        assert!(effect.tick(0.0));
    }

    #[test]
    fn test_bad_dt_ignored() {
        let mut effect = TimedEffect::new();
        effect.start(1.0, 1.0);
        assert!(!effect.tick(f32::NAN));
        assert!(!effect.tick(-3.0));
        assert_eq!(effect.elapsed, 0.0);
    }

    proptest! {
        #[test]
        fn prop_progress_in_unit_range(
            duration in 0.0f32..10.0,
            steps in proptest::collection::vec(-1.0f32..1.0, 0..64),
        ) {
            let mut effect = TimedEffect::new();
            effect.start(duration, 1.0);
            for dt in steps {
                effect.tick(dt);
                let p = effect.progress();
                prop_assert!((0.0..=1.0).contains(&p));
            }
        }
    }
}
