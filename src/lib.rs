//! # Skier Simulation
//!
//! Fixed-step simulation of a downhill skier: steering, boost, and the
//! obstacles that slow, stop or simply disappear under the skis.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SKIER SIM                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── math.rs     - Clamping, lerp, input sanitizing          │
//! │  ├── vec3.rs     - 3D vector and yaw directions              │
//! │  └── hash.rs     - State hashing for replay checks           │
//! │                                                              │
//! │  game/           - Run logic                                 │
//! │  ├── config.rs   - Tunables and validation                   │
//! │  ├── turn.rs     - Heading model                             │
//! │  ├── motion.rs   - Boost, slowdown, knockback                │
//! │  ├── host.rs     - Engine seam + headless host               │
//! │  ├── state.rs    - Entity registry                           │
//! │  ├── collision.rs- Contact reactions                         │
//! │  └── tick.rs     - Fixed-step loop                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! - No HashMap (BTreeMap for sorted iteration)
//! - No system time; every timer advances by the supplied step
//! - Contacts are resolved in the order given, effects applied after
//!
//! Given identical inputs and step, a run produces the same state hash on
//! every replay.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::core::vec3::Vec3;
pub use crate::game::config::{RunConfig, SkierConfig};
pub use crate::game::input::InputFrame;
pub use crate::game::state::{EntityId, RunState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 50;
