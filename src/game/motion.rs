//! Motion Controller
//!
//! Per-tick integration of the turn model into a body rotation and
//! velocity, plus the speed modifiers that hits and boosts apply.
//!
//! ## Speed modifiers
//!
//! ```text
//! knockback active  -> 0
//! otherwise         -> base = baseline * (boosting ? multiplier : 1)
//!   slowdown active -> lerp(base * factor, base, progress)
//! ```
//!
//! Knockback overrides everything. Boost and slowdown compose: a slowed
//! skier who boosts recovers toward the boosted speed. The baseline is never
//! mutated, so ending a boost restores it exactly.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::hash::StateHasher;
use crate::core::math::{clamp01, lerp, sanitize_dt, NEUTRAL_HEADING};
use crate::core::vec3::Vec3;
use crate::game::config::SkierConfig;
use crate::game::effect::TimedEffect;
use crate::game::host::Host;
use crate::game::input::InputFrame;
use crate::game::state::EntityId;
use crate::game::turn::{TurnModel, TurnOutput};

/// Animation parameter fed with the current forward speed.
pub const SPEED_PARAM: &str = "Speed";

/// Dominant speed modifier, for display and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedState {
    /// No modifier running
    Normal,
    /// Boost running, no hit effect
    Boosting,
    /// Recovering from a slowdown hit (boost may also be running)
    Slowed,
    /// Stopped by a knockback
    KnockedBack,
}

/// Effect transitions observed during a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectChange {
    /// Boost started from input
    BoostStarted,
    /// Boost ran out
    BoostEnded,
    /// Slowdown fully recovered
    SlowdownRecovered,
    /// Knockback window ended
    KnockbackEnded,
}

/// Everything the controller owns between ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotionState {
    /// Current heading (degrees, 180 = straight down the slope)
    pub heading: f32,
    /// Unmodified forward speed
    pub baseline_speed: f32,
    /// Forward speed computed on the last tick
    pub current_speed: f32,
    /// Grounded flag from the last tick
    pub grounded: bool,
    /// Speed boost
    pub boost: TimedEffect,
    /// Slowdown recovery
    pub slowdown: TimedEffect,
    /// Knockback stop
    pub knockback: TimedEffect,
}

impl MotionState {
    /// Fresh state facing neutral.
    pub fn new(baseline_speed: f32) -> Self {
        Self {
            heading: NEUTRAL_HEADING,
            baseline_speed,
            current_speed: 0.0,
            grounded: false,
            boost: TimedEffect::new(),
            slowdown: TimedEffect::new(),
            knockback: TimedEffect::new(),
        }
    }
}

/// Output of [`MotionController::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct MotionStep {
    /// Heading and speed after the turn model
    pub output: TurnOutput,
    /// Grounded this tick
    pub grounded: bool,
    /// Velocity committed to the body (None while airborne)
    pub velocity: Option<Vec3>,
    /// Effect transitions during this tick
    pub changes: Vec<EffectChange>,
}

/// Steering, speed and timed effects of one skier.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionController {
    config: SkierConfig,
    turn: TurnModel,
    state: MotionState,
}

impl MotionController {
    /// Create a controller facing neutral at baseline speed.
    pub fn new(config: SkierConfig) -> Self {
        let turn = TurnModel::from_config(&config);
        let state = MotionState::new(config.movement_speed.max(0.0));
        Self { config, turn, state }
    }

    /// Controller tunables.
    pub fn config(&self) -> &SkierConfig {
        &self.config
    }

    /// Read-only view of the owned state.
    pub fn state(&self) -> &MotionState {
        &self.state
    }

    /// Current heading.
    #[inline]
    pub fn heading(&self) -> f32 {
        self.state.heading
    }

    /// Speed before heading is taken into account, with every modifier
    /// applied.
    pub fn movement_speed(&self) -> f32 {
        let s = &self.state;
        if s.knockback.active {
            return 0.0;
        }

        let mut base = s.baseline_speed;
        if s.boost.active {
            base *= s.boost.magnitude;
        }
        if s.slowdown.active {
            base = lerp(base * s.slowdown.magnitude, base, s.slowdown.progress());
        }
        base.max(0.0)
    }

    /// Forward speed from the last tick.
    #[inline]
    pub fn current_speed(&self) -> f32 {
        self.state.current_speed
    }

    /// Unmodified forward speed.
    #[inline]
    pub fn baseline_speed(&self) -> f32 {
        self.state.baseline_speed
    }

    /// Is a boost running?
    #[inline]
    pub fn is_boosting(&self) -> bool {
        self.state.boost.active
    }

    /// Is a slowdown recovering?
    #[inline]
    pub fn is_slowed(&self) -> bool {
        self.state.slowdown.active
    }

    /// Is a knockback running?
    #[inline]
    pub fn is_knocked_back(&self) -> bool {
        self.state.knockback.active
    }

    /// Dominant modifier.
    pub fn speed_state(&self) -> SpeedState {
        if self.is_knocked_back() {
            SpeedState::KnockedBack
        } else if self.is_slowed() {
            SpeedState::Slowed
        } else if self.is_boosting() {
            SpeedState::Boosting
        } else {
            SpeedState::Normal
        }
    }

    /// Start a boost unless one is running. Returns whether it started.
    pub fn apply_boost(&mut self) -> bool {
        if self.state.boost.active {
            return false;
        }
        self.state
            .boost
            .start(self.config.boost_duration, self.config.boost_multiplier);
        debug!(
            multiplier = self.config.boost_multiplier,
            duration = self.config.boost_duration,
            "boost started"
        );
        true
    }

    /// Drop speed to `factor` of its current base and recover linearly over
    /// the slowdown duration. A new hit restarts the recovery.
    ///
    /// Non-finite factors are ignored; others are clamped to [0, 1].
    pub fn apply_slowdown(&mut self, factor: f32) -> bool {
        if !factor.is_finite() {
            debug!(factor, "ignoring non-finite slowdown factor");
            return false;
        }
        let factor = clamp01(factor);
        self.state.slowdown.start(self.config.slowdown_duration, factor);
        debug!(factor, duration = self.config.slowdown_duration, "slowdown applied");
        true
    }

    /// Stop dead for the knockback duration. A new hit restarts the window.
    pub fn apply_knockback(&mut self) {
        self.state.knockback.start(self.config.knockback_duration, 0.0);
        debug!(duration = self.config.knockback_duration, "knockback started");
    }

    /// Run one fixed step for `entity`.
    ///
    /// Rotation is always committed. Horizontal velocity is only committed
    /// while grounded; the body's vertical velocity is carried through
    /// unchanged either way.
    pub fn tick<H: Host + ?Sized>(
        &mut self,
        entity: EntityId,
        input: &InputFrame,
        dt: f32,
        host: &mut H,
    ) -> MotionStep {
        let dt = sanitize_dt(dt);
        let input = input.sanitized();

        let position = host.position(entity);
        let grounded = host.ground_below(position, self.config.ground_probe_distance);

        let horizontal = if self.config.invert_horizontal {
            -input.horizontal
        } else {
            input.horizontal
        };

        let output = self.turn.update(
            self.state.heading,
            horizontal,
            input.vertical,
            grounded,
            dt,
            self.movement_speed(),
        );
        self.state.heading = output.heading;
        self.state.current_speed = output.speed;
        self.state.grounded = grounded;

        let planar = Vec3::from_yaw_degrees(output.heading).scale(output.speed);
        let velocity = planar.with_y(host.linear_velocity(entity).y);
        let committed = grounded.then_some(velocity);
        host.commit_motion(entity, output.heading, committed);
        host.set_float(entity, SPEED_PARAM, output.speed);

        #[cfg(feature = "debug-tracing")]
        trace!(
            entity = entity.0,
            heading = output.heading,
            speed = output.speed,
            grounded,
            "motion step"
        );

        let mut changes = self.advance_effects(dt);

        if input.boost && grounded && self.apply_boost() {
            changes.push(EffectChange::BoostStarted);
        }

        MotionStep { output, grounded, velocity: committed, changes }
    }

    /// Advance every running effect, reporting expiries.
    fn advance_effects(&mut self, dt: f32) -> Vec<EffectChange> {
        let mut changes = Vec::new();
        if self.state.boost.tick(dt) {
            trace!("boost expired");
            changes.push(EffectChange::BoostEnded);
        }
        if self.state.slowdown.tick(dt) {
            trace!("slowdown recovered");
            changes.push(EffectChange::SlowdownRecovered);
        }
        if self.state.knockback.tick(dt) {
            trace!("knockback expired");
            changes.push(EffectChange::KnockbackEnded);
        }
        changes
    }

    /// Hash this controller's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_f32(self.state.heading);
        hasher.update_f32(self.state.baseline_speed);
        hasher.update_f32(self.state.current_speed);
        hasher.update_bool(self.state.grounded);
        self.state.boost.hash_into(hasher);
        self.state.slowdown.hash_into(hasher);
        self.state.knockback.hash_into(hasher);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::approx_eq;
    use crate::game::config::RunConfig;
    use crate::game::host::HeadlessHost;

    const ID: EntityId = EntityId(0);

    fn setup(config: SkierConfig) -> (MotionController, HeadlessHost) {
        let mut host = HeadlessHost::new();
        host.insert_body(ID, Vec3::ZERO);
        (MotionController::new(config), host)
    }

    fn run(ctrl: &mut MotionController, host: &mut HeadlessHost, input: InputFrame, dt: f32, n: usize) {
        for _ in 0..n {
            ctrl.tick(ID, &input, dt, host);
        }
    }

    #[test]
    fn test_straight_run_full_speed() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        let step = ctrl.tick(ID, &InputFrame::new(), 0.02, &mut host);

        assert!(step.grounded);
        assert_eq!(step.output.heading, 180.0);
        assert_eq!(step.output.speed, 10.0);

        let v = step.velocity.unwrap();
        assert!(approx_eq(v.x, 0.0));
        assert!(approx_eq(v.z, -10.0));
        assert_eq!(host.float_param(ID, SPEED_PARAM), Some(10.0));
    }

    #[test]
    fn test_horizontal_axis_inverted_by_default() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        ctrl.tick(ID, &InputFrame::with_axes(1.0, 0.0), 0.02, &mut host);
        assert!(ctrl.heading() < 180.0);

        let config = SkierConfig { invert_horizontal: false, ..Default::default() };
        let (mut ctrl, mut host) = setup(config);
        ctrl.tick(ID, &InputFrame::with_axes(1.0, 0.0), 0.02, &mut host);
        assert!(ctrl.heading() > 180.0);
    }

    #[test]
    fn test_airborne_keeps_heading_and_velocity() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        host.insert_body(ID, Vec3::new(0.0, 5.0, 0.0));
        host.set_velocity(ID, Vec3::new(1.0, -2.0, 3.0));

        let step = ctrl.tick(ID, &InputFrame::with_axes(1.0, 0.0), 0.02, &mut host);

        assert!(!step.grounded);
        assert_eq!(step.velocity, None);
        assert_eq!(ctrl.heading(), 180.0);
        // Rotation still committed, velocity untouched
        assert_eq!(host.heading(ID), Some(180.0));
        assert_eq!(host.velocity(ID), Vec3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn test_vertical_velocity_preserved() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        host.set_velocity(ID, Vec3::new(0.0, -1.5, 0.0));

        let step = ctrl.tick(ID, &InputFrame::new(), 0.02, &mut host);
        assert_eq!(step.velocity.unwrap().y, -1.5);
    }

    #[test]
    fn test_boost_multiplies_then_restores() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        let before = ctrl.movement_speed();

        assert!(ctrl.apply_boost());
        assert_eq!(ctrl.movement_speed(), before * 2.0);
        assert_eq!(ctrl.speed_state(), SpeedState::Boosting);

        // Second boost while running is rejected
        assert!(!ctrl.apply_boost());

        // 3.0s at 0.5s per tick
        run(&mut ctrl, &mut host, InputFrame::new(), 0.5, 6);
        assert!(!ctrl.is_boosting());
        assert_eq!(ctrl.movement_speed(), before);
    }

    #[test]
    fn test_repeated_boosts_do_not_drift() {
        let config = SkierConfig { boost_multiplier: 1.37, movement_speed: 9.1, ..Default::default() };
        let (mut ctrl, mut host) = setup(config);
        for _ in 0..50 {
            ctrl.apply_boost();
            run(&mut ctrl, &mut host, InputFrame::new(), 1.0, 3);
        }
        assert_eq!(ctrl.movement_speed(), 9.1);
    }

    #[test]
    fn test_boost_input_requires_ground() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        host.insert_body(ID, Vec3::new(0.0, 3.0, 0.0));
        let step = ctrl.tick(ID, &InputFrame::new().with_boost(), 0.02, &mut host);
        assert!(step.changes.is_empty());
        assert!(!ctrl.is_boosting());

        host.insert_body(ID, Vec3::ZERO);
        let step = ctrl.tick(ID, &InputFrame::new().with_boost(), 0.02, &mut host);
        assert_eq!(step.changes, vec![EffectChange::BoostStarted]);
        assert!(ctrl.is_boosting());
    }

    #[test]
    fn test_boost_lasts_full_duration_of_ticks() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        ctrl.tick(ID, &InputFrame::new().with_boost(), 0.5, &mut host);

        let mut boosted_ticks = 0;
        for _ in 0..10 {
            let step = ctrl.tick(ID, &InputFrame::new(), 0.5, &mut host);
            if step.output.speed == 20.0 {
                boosted_ticks += 1;
            }
        }
        assert_eq!(boosted_ticks, 6);
    }

    #[test]
    fn test_slowdown_recovers_linearly() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        assert!(ctrl.apply_slowdown(0.5));
        assert_eq!(ctrl.movement_speed(), 5.0);

        run(&mut ctrl, &mut host, InputFrame::new(), 1.5, 1);
        assert!(approx_eq(ctrl.movement_speed(), 7.5));

        run(&mut ctrl, &mut host, InputFrame::new(), 1.5, 1);
        assert!(!ctrl.is_slowed());
        assert_eq!(ctrl.movement_speed(), 10.0);
    }

    #[test]
    fn test_slowdown_restart_and_bad_factor() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        ctrl.apply_slowdown(0.5);
        run(&mut ctrl, &mut host, InputFrame::new(), 1.0, 2);

        ctrl.apply_slowdown(0.2);
        assert!(approx_eq(ctrl.movement_speed(), 2.0));

        assert!(!ctrl.apply_slowdown(f32::NAN));
        assert!(ctrl.apply_slowdown(-3.0));
        assert_eq!(ctrl.movement_speed(), 0.0);
    }

    #[test]
    fn test_knockback_zero_for_window() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        ctrl.apply_knockback();
        assert_eq!(ctrl.speed_state(), SpeedState::KnockedBack);

        // 1.5s at 0.5s per tick: three stopped ticks
        for _ in 0..3 {
            let step = ctrl.tick(ID, &InputFrame::new(), 0.5, &mut host);
            assert_eq!(step.output.speed, 0.0);
        }
        assert!(!ctrl.is_knocked_back());

        let step = ctrl.tick(ID, &InputFrame::new(), 0.5, &mut host);
        assert_eq!(step.output.speed, 10.0);
    }

    #[test]
    fn test_effect_windows_at_default_step() {
        let dt = RunConfig::default().fixed_dt;

        // Boost: 150 ticks at 2x, then back to the baseline
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        ctrl.apply_boost();
        let mut boosted = 0;
        for _ in 0..200 {
            if ctrl.tick(ID, &InputFrame::new(), dt, &mut host).output.speed == 20.0 {
                boosted += 1;
            }
        }
        assert_eq!(boosted, 150);

        // Slowdown: fully recovered after exactly 150 ticks
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        ctrl.apply_slowdown(0.5);
        run(&mut ctrl, &mut host, InputFrame::new(), dt, 149);
        assert!(ctrl.is_slowed());
        run(&mut ctrl, &mut host, InputFrame::new(), dt, 1);
        assert!(!ctrl.is_slowed());
        assert_eq!(ctrl.movement_speed(), 10.0);

        // Knockback: 1.5s is 75 stopped ticks
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        ctrl.apply_knockback();
        let mut stopped = 0;
        for _ in 0..100 {
            if ctrl.tick(ID, &InputFrame::new(), dt, &mut host).output.speed == 0.0 {
                stopped += 1;
            }
        }
        assert_eq!(stopped, 75);
    }

    #[test]
    fn test_knockback_overrides_boost() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        ctrl.apply_boost();
        ctrl.apply_knockback();
        assert_eq!(ctrl.movement_speed(), 0.0);

        // Knockback ends first, boost still running
        run(&mut ctrl, &mut host, InputFrame::new(), 0.5, 3);
        assert_eq!(ctrl.movement_speed(), 20.0);
    }

    #[test]
    fn test_boost_and_slowdown_compose() {
        let (mut ctrl, _host) = setup(SkierConfig::default());
        ctrl.apply_boost();
        ctrl.apply_slowdown(0.5);
        assert_eq!(ctrl.movement_speed(), 10.0);
        assert_eq!(ctrl.speed_state(), SpeedState::Slowed);
    }

    #[test]
    fn test_expiry_changes_reported() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        ctrl.apply_knockback();
        ctrl.apply_slowdown(0.5);
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.extend(ctrl.tick(ID, &InputFrame::new(), 0.5, &mut host).changes);
        }
        assert_eq!(seen, vec![EffectChange::KnockbackEnded, EffectChange::SlowdownRecovered]);
    }

    #[test]
    fn test_bad_dt_is_a_no_op_for_timers() {
        let (mut ctrl, mut host) = setup(SkierConfig::default());
        ctrl.apply_knockback();
        ctrl.tick(ID, &InputFrame::new(), f32::NAN, &mut host);
        ctrl.tick(ID, &InputFrame::new(), -1.0, &mut host);
        assert!(ctrl.is_knocked_back());
        assert_eq!(ctrl.state().knockback.elapsed, 0.0);
    }
}
