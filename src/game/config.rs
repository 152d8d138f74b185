//! Run Configuration
//!
//! Tunables for the skier controller and the fixed-step loop.
//! Loaded from JSON; every field has a default so partial files work.

use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A tunable is NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NotFinite {
        /// Field name
        field: &'static str,
        /// Offending value
        value: f32,
    },

    /// A tunable that must be strictly positive is not.
    #[error("{field} must be positive, got {value}")]
    NotPositive {
        /// Field name
        field: &'static str,
        /// Offending value
        value: f32,
    },

    /// Max turn angle outside (0, 180].
    #[error("max_turn_angle must be in (0, 180], got {0}")]
    TurnAngleOutOfRange(f32),

    /// Diagonal turn is wider than the max turn.
    #[error("diagonal_turn_angle ({diagonal}) exceeds max_turn_angle ({max})")]
    DiagonalExceedsMax {
        /// Diagonal angle
        diagonal: f32,
        /// Max angle
        max: f32,
    },

    /// Slowdown factor outside [0, 1].
    #[error("slowdown factor must be in [0, 1], got {0}")]
    SlowdownFactorOutOfRange(f32),

    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables of a single skier's motion controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkierConfig {
    /// Heading interpolation rate (per second)
    pub turn_speed: f32,
    /// Max deviation from neutral heading (degrees)
    pub max_turn_angle: f32,
    /// Deviation when braking and steering together (degrees)
    pub diagonal_turn_angle: f32,
    /// Base forward speed (units/sec)
    pub movement_speed: f32,
    /// Speed multiplier while boosting
    pub boost_multiplier: f32,
    /// Boost length (seconds)
    pub boost_duration: f32,
    /// Time to recover from a slowdown hit (seconds)
    pub slowdown_duration: f32,
    /// Time spent stopped after a knockback (seconds)
    pub knockback_duration: f32,
    /// Downward probe length for the grounded check
    pub ground_probe_distance: f32,
    /// Negate the horizontal axis before steering.
    ///
    /// The skier spawns facing backward, so screen-right maps to a
    /// negative turn.
    pub invert_horizontal: bool,
}

impl Default for SkierConfig {
    fn default() -> Self {
        Self {
            turn_speed: 5.0,
            max_turn_angle: 90.0,
            diagonal_turn_angle: 45.0,
            movement_speed: 10.0,
            boost_multiplier: 2.0,
            boost_duration: 3.0,
            slowdown_duration: 3.0,
            knockback_duration: 1.5,
            ground_probe_distance: 0.1,
            invert_horizontal: true,
        }
    }
}

impl SkierConfig {
    /// Check every tunable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("turn_speed", self.turn_speed),
            ("max_turn_angle", self.max_turn_angle),
            ("diagonal_turn_angle", self.diagonal_turn_angle),
            ("movement_speed", self.movement_speed),
            ("boost_multiplier", self.boost_multiplier),
            ("boost_duration", self.boost_duration),
            ("slowdown_duration", self.slowdown_duration),
            ("knockback_duration", self.knockback_duration),
            ("ground_probe_distance", self.ground_probe_distance),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        let positive = [
            ("boost_multiplier", self.boost_multiplier),
            ("boost_duration", self.boost_duration),
            ("slowdown_duration", self.slowdown_duration),
            ("knockback_duration", self.knockback_duration),
            ("ground_probe_distance", self.ground_probe_distance),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        if self.turn_speed < 0.0 {
            return Err(ConfigError::NotPositive { field: "turn_speed", value: self.turn_speed });
        }
        if self.movement_speed < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "movement_speed",
                value: self.movement_speed,
            });
        }
        if self.max_turn_angle <= 0.0 || self.max_turn_angle > 180.0 {
            return Err(ConfigError::TurnAngleOutOfRange(self.max_turn_angle));
        }
        if self.diagonal_turn_angle < 0.0 || self.diagonal_turn_angle > self.max_turn_angle {
            return Err(ConfigError::DiagonalExceedsMax {
                diagonal: self.diagonal_turn_angle,
                max: self.max_turn_angle,
            });
        }
        Ok(())
    }
}

/// Configuration for a whole run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Skier controller tunables
    pub skier: SkierConfig,
    /// Fixed simulation step (seconds)
    pub fixed_dt: f32,
    /// Factor used by slowdown obstacles spawned without an explicit one
    pub default_slowdown_factor: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            skier: SkierConfig::default(),
            fixed_dt: 0.02, // 50 Hz
            default_slowdown_factor: 0.5,
        }
    }
}

impl RunConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every tunable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.skier.validate()?;
        if !self.fixed_dt.is_finite() {
            return Err(ConfigError::NotFinite { field: "fixed_dt", value: self.fixed_dt });
        }
        if self.fixed_dt <= 0.0 {
            return Err(ConfigError::NotPositive { field: "fixed_dt", value: self.fixed_dt });
        }
        validate_slowdown_factor(self.default_slowdown_factor)
    }
}

/// Slowdown factors scale speed, so they must stay within [0, 1].
pub fn validate_slowdown_factor(factor: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&factor) {
        return Err(ConfigError::SlowdownFactorOutOfRange(factor));
    }
    Ok(())
}
