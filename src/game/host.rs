//! Host Capabilities
//!
//! The simulation never touches physics, animation or audio directly. The
//! host engine supplies them through [`Host`]. [`HeadlessHost`] is a flat
//! slope with gravity that records everything committed to it; the demo
//! binary and the tests run against it.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::core::math::sanitize_dt;
use crate::core::vec3::Vec3;
use crate::game::state::EntityId;

/// Audio cues the simulation can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Skier hit a solid obstacle
    Knockback,
}

/// Engine-side capabilities used by the simulation.
pub trait Host {
    /// World position of a body.
    fn position(&self, entity: EntityId) -> Vec3;

    /// Is there ground within `max_distance` straight below `origin`?
    fn ground_below(&self, origin: Vec3, max_distance: f32) -> bool;

    /// Current linear velocity of a body.
    fn linear_velocity(&self, entity: EntityId) -> Vec3;

    /// Set a body's yaw and, if given, its linear velocity.
    fn commit_motion(&mut self, entity: EntityId, heading_deg: f32, velocity: Option<Vec3>);

    /// Feed a numeric animation parameter.
    fn set_float(&mut self, _entity: EntityId, _param: &str, _value: f32) {}

    /// Fire-and-forget positional audio.
    fn play_cue(&mut self, _cue: Cue, _position: Vec3) {}

    /// Drop the body of an entity reclaimed this tick.
    fn despawn(&mut self, _entity: EntityId) {}

    /// Advance the host's own physics by `dt`, after the simulation has
    /// committed this tick's motion.
    fn step(&mut self, _dt: f32) {}
}

/// A rigid body tracked by [`HeadlessHost`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// World position
    pub position: Vec3,
    /// Linear velocity
    pub velocity: Vec3,
    /// Last committed yaw
    pub heading: Option<f32>,
}

/// A cue played through [`HeadlessHost`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayedCue {
    /// Which cue
    pub cue: Cue,
    /// Where it was played
    pub position: Vec3,
}

/// Flat-ground reference host.
#[derive(Clone, Debug)]
pub struct HeadlessHost {
    bodies: BTreeMap<EntityId, Body>,
    /// Height of the ground plane
    pub ground_height: f32,
    /// Vertical acceleration (negative is down)
    pub gravity: f32,
    float_params: BTreeMap<(EntityId, String), f32>,
    cues: Vec<PlayedCue>,
}

impl HeadlessHost {
    /// Flat ground at y = 0 with standard gravity.
    pub fn new() -> Self {
        Self {
            bodies: BTreeMap::new(),
            ground_height: 0.0,
            gravity: -9.81,
            float_params: BTreeMap::new(),
            cues: Vec::new(),
        }
    }

    /// Add or replace a body at rest.
    pub fn insert_body(&mut self, entity: EntityId, position: Vec3) {
        self.bodies.insert(entity, Body { position, ..Body::default() });
    }

    /// Drop a body.
    pub fn remove_body(&mut self, entity: EntityId) -> Option<Body> {
        self.bodies.remove(&entity)
    }

    /// Look up a body.
    pub fn body(&self, entity: EntityId) -> Option<&Body> {
        self.bodies.get(&entity)
    }

    /// Overwrite a body's velocity.
    pub fn set_velocity(&mut self, entity: EntityId, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.velocity = velocity;
        }
    }

    /// Velocity of a body (zero if unknown).
    pub fn velocity(&self, entity: EntityId) -> Vec3 {
        self.bodies.get(&entity).map(|b| b.velocity).unwrap_or_default()
    }

    /// Last committed yaw of a body.
    pub fn heading(&self, entity: EntityId) -> Option<f32> {
        self.bodies.get(&entity).and_then(|b| b.heading)
    }

    /// Last value fed to an animation parameter.
    pub fn float_param(&self, entity: EntityId, param: &str) -> Option<f32> {
        self.float_params.get(&(entity, param.to_string())).copied()
    }

    /// Every cue played so far.
    pub fn cues(&self) -> &[PlayedCue] {
        &self.cues
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for HeadlessHost {
    fn position(&self, entity: EntityId) -> Vec3 {
        self.bodies.get(&entity).map(|b| b.position).unwrap_or_default()
    }

    fn ground_below(&self, origin: Vec3, max_distance: f32) -> bool {
        origin.y - self.ground_height <= max_distance
    }

    fn linear_velocity(&self, entity: EntityId) -> Vec3 {
        self.velocity(entity)
    }

    fn commit_motion(&mut self, entity: EntityId, heading_deg: f32, velocity: Option<Vec3>) {
        if let Some(body) = self.bodies.get_mut(&entity) {
            body.heading = Some(heading_deg);
            if let Some(v) = velocity {
                body.velocity = v;
            }
        }
    }

    fn set_float(&mut self, entity: EntityId, param: &str, value: f32) {
        self.float_params.insert((entity, param.to_string()), value);
    }

    fn play_cue(&mut self, cue: Cue, position: Vec3) {
        self.cues.push(PlayedCue { cue, position });
    }

    fn despawn(&mut self, entity: EntityId) {
        self.remove_body(entity);
    }

    /// Integrate gravity and velocity for every body, resting on the ground.
    fn step(&mut self, dt: f32) {
        let dt = sanitize_dt(dt);
        for body in self.bodies.values_mut() {
            if body.position.y > self.ground_height {
                body.velocity.y += self.gravity * dt;
            }

            body.position = body.position + body.velocity.scale(dt);

            if body.position.y < self.ground_height {
                body.position.y = self.ground_height;
                body.velocity.y = body.velocity.y.max(0.0);
            }
        }
    }
}
