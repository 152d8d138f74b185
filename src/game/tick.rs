//! Simulation Tick
//!
//! One fixed step of a run. The order is fixed:
//!
//! 1. advance every skier's motion controller (ID order)
//! 2. run the collision reactor over this tick's contacts
//! 3. apply the queued reactor commands
//! 4. reclaim entities marked for removal
//! 5. let the host integrate its physics
//! 6. drain events

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::math::sanitize_dt;
use crate::game::collision::{CollisionReactor, Contact, ReactorCommand};
use crate::game::config::RunConfig;
use crate::game::events::GameEvent;
use crate::game::host::{Cue, Host};
use crate::game::input::InputFrame;
use crate::game::motion::EffectChange;
use crate::game::state::{EntityId, RunState};

/// Everything the host hands the simulation for one tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Directional input, shared by every skier
    pub frame: InputFrame,
    /// Contacts that began since the last tick
    pub contacts: Vec<Contact>,
}

impl TickInput {
    /// Input with no contacts.
    pub fn from_frame(frame: InputFrame) -> Self {
        Self { frame, contacts: Vec::new() }
    }
}

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Entities reclaimed this tick
    pub removed: Vec<EntityId>,
}

/// Run one simulation tick of `dt` seconds.
///
/// Non-finite or negative `dt` is treated as zero: rotation and velocity
/// are still committed but no timer advances.
pub fn tick<H: Host + ?Sized>(
    state: &mut RunState,
    input: &TickInput,
    host: &mut H,
    dt: f32,
) -> TickResult {
    let mut result = TickResult::default();
    let dt = sanitize_dt(dt);

    // 0. Advance tick counter
    state.tick += 1;

    // 1. Motion
    update_motion(state, &input.frame, host, dt);

    // 2. Contacts
    let mut reactor = CollisionReactor::new();
    for contact in &input.contacts {
        reactor.handle(state, contact);
    }

    // 3. Commands
    for command in reactor.drain() {
        apply_command(state, host, command);
    }

    // 4. Cleanup
    for removed in state.cleanup() {
        if let Some(kind) = removed.obstacle {
            let event = GameEvent::obstacle_removed(state.tick, removed.id, kind);
            state.push_event(event);
        }
        host.despawn(removed.id);
        result.removed.push(removed.id);
    }

    // 5. Physics
    host.step(dt);

    // 6. Events
    result.events = state.take_events();
    result
}

/// Run one tick at the configured fixed step.
pub fn fixed_tick<H: Host + ?Sized>(
    state: &mut RunState,
    input: &TickInput,
    host: &mut H,
    config: &RunConfig,
) -> TickResult {
    tick(state, input, host, config.fixed_dt)
}

/// Advance every live skier's controller.
fn update_motion<H: Host + ?Sized>(state: &mut RunState, frame: &InputFrame, host: &mut H, dt: f32) {
    let current_tick = state.tick;

    for skier_id in state.skier_ids() {
        let Some(controller) = state.controller_mut(skier_id) else { continue };
        let step = controller.tick(skier_id, frame, dt, host);

        for change in step.changes {
            let event = match change {
                EffectChange::BoostStarted => GameEvent::boost_started(current_tick, skier_id),
                EffectChange::BoostEnded => GameEvent::boost_ended(current_tick, skier_id),
                EffectChange::SlowdownRecovered => {
                    GameEvent::slowdown_recovered(current_tick, skier_id)
                }
                EffectChange::KnockbackEnded => GameEvent::knockback_ended(current_tick, skier_id),
            };
            state.push_event(event);
        }
    }
}

/// Apply one reactor command. Commands for vanished skiers are dropped.
fn apply_command<H: Host + ?Sized>(state: &mut RunState, host: &mut H, command: ReactorCommand) {
    let current_tick = state.tick;

    match command {
        ReactorCommand::ApplySlowdown { skier, factor } => {
            let Some(controller) = state.controller_mut(skier) else {
                debug!(skier = skier.0, "slowdown target vanished");
                return;
            };
            if controller.apply_slowdown(factor) {
                state.push_event(GameEvent::slowdown_applied(current_tick, skier, factor));
            }
        }
        ReactorCommand::Knockback { skier } => {
            let Some(controller) = state.controller_mut(skier) else {
                debug!(skier = skier.0, "knockback target vanished");
                return;
            };
            controller.apply_knockback();
            let position = host.position(skier);
            host.play_cue(Cue::Knockback, position);
            state.push_event(GameEvent::knockback_started(current_tick, skier));
        }
    }
}

/// Replay a run from recorded inputs at a fixed step.
///
/// Returns the final state and every event produced.
pub fn replay_run<H: Host + ?Sized>(
    initial_state: RunState,
    inputs: &[TickInput],
    host: &mut H,
    dt: f32,
) -> (RunState, Vec<GameEvent>) {
    let mut state = initial_state;
    let mut all_events = Vec::new();

    for input in inputs {
        let result = tick(&mut state, input, host, dt);
        all_events.extend(result.events);
    }

    (state, all_events)
}

// =============================================================================
// TESTS
// =============================================================================
