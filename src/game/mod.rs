//! Game Logic Module
//!
//! All run simulation code. Deterministic for a given input sequence and
//! fixed step.
//!
//! ## Module Structure
//!
//! - `config`: Tunables, JSON loading and validation
//! - `input`: Per-tick directional input
//! - `effect`: Countdown timers for temporary speed modifiers
//! - `turn`: Heading and heading-dependent speed
//! - `motion`: Per-skier motion controller
//! - `host`: Engine capabilities and the headless reference host
//! - `state`: Entity registry with two-phase removal
//! - `collision`: Contact reactions and proximity contact tracking
//! - `tick`: Fixed-step simulation loop
//! - `events`: Game events for logging and replay comparison

pub mod config;
pub mod input;
pub mod effect;
pub mod turn;
pub mod motion;
pub mod host;
pub mod state;
pub mod collision;
pub mod tick;
pub mod events;

// Re-export key types
pub use config::{ConfigError, RunConfig, SkierConfig};
pub use input::InputFrame;
pub use motion::{MotionController, SpeedState};
pub use host::{Cue, HeadlessHost, Host};
pub use state::{EntityId, ObstacleKind, RunState, Tag};
pub use collision::{Contact, ContactKind, ContactTracker};
pub use tick::{TickInput, TickResult};
pub use events::{GameEvent, GameEventData};
