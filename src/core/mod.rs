//! Core numeric primitives.
//!
//! Float helpers that never propagate NaN, a small 3D vector and the
//! state hasher used for replay verification.

pub mod math;
pub mod vec3;
pub mod hash;

// Re-export core types
pub use math::{lerp, clamp, clamp01, sanitize_dt, sanitize_axis, NEUTRAL_HEADING};
pub use vec3::Vec3;
pub use hash::{compute_state_hash, StateHash, StateHasher};
