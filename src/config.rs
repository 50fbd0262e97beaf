use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physics timing. Every per-tick constant below is tuned to this cadence:
/// gravity and friction are applied once per tick, not scaled by a real dt.
pub const PHYSICS_HZ: f64 = 60.0;

/// Motion
pub const GRAVITY: f32 = 0.5;
pub const FRICTION: f32 = 0.99;
pub const GROUND_FRICTION: f32 = 0.95;
pub const BOUNCE_DAMPING: f32 = 0.7;

/// Near-rest jitter suppression
pub const REST_THRESHOLD_SPEED: f32 = 0.1;
pub const REST_DAMPING: f32 = 0.9;

/// Pairwise contacts
pub const MIN_SEPARATION_VELOCITY: f32 = 0.1;
pub const COLLISION_DAMPING: f32 = 0.98;

/// Throwing
pub const MAX_THROW_VELOCITY: f32 = 15.0;
pub const VELOCITY_MULTIPLIER: f32 = 0.02;
pub const HISTORY_CAPACITY: usize = 5;
pub const THROW_SAMPLE_WINDOW: usize = 3;

/// Dragging pushes whatever the held ball runs into
pub const DRAG_PUSH_STRENGTH: f32 = 0.5;
pub const DRAG_PUSH_FRACTION: f32 = 0.3;

pub const RESIZE_DEOVERLAP_ITERATIONS: usize = 10;

/// Ball defaults
pub const BALL_RADIUS: f32 = 30.0;
pub const MASS_DENSITY_FACTOR: f32 = 0.1;
pub const MAX_BODIES: usize = 40;
pub const INITIAL_BODIES: usize = 12;
pub const SPAWN_SPEED: f32 = 3.0;

/// Upper bound for any per-tick speed or acceleration in `SimConfig`.
pub const MAX_PER_TICK: f32 = 1.0e6;

/// Cursor gizmo radius in the windowed app
pub const CURSOR_RADIUS: f32 = 6.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ball radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("mass density factor must be positive, got {0}")]
    NonPositiveDensity(f32),
    #[error("{name} must lie in [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f32 },
    #[error("{name} must lie in (0, 1], got {value}")]
    InvalidFactor { name: &'static str, value: f32 },
    #[error("{name} must be finite and non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("max throw velocity must be positive, got {0}")]
    NonPositiveMaxThrow(f32),
    #[error("{name} must not exceed {max}, got {value}")]
    TooLarge {
        name: &'static str,
        max: f32,
        value: f32,
    },
    #[error("ball mass overflows for radius {radius} and density {density}")]
    MassOverflow { radius: f32, density: f32 },
    #[error("{name} must be at least {min}, got {value}")]
    TooSmall {
        name: &'static str,
        min: usize,
        value: usize,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Every tunable of the simulator. Missing JSON fields fall back to the
/// constants above.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    pub gravity: f32,
    pub friction: f32,
    pub ground_friction: f32,
    pub bounce_damping: f32,
    pub max_throw_velocity: f32,
    pub velocity_multiplier: f32,
    pub ball_radius: f32,
    pub mass_density_factor: f32,
    pub rest_threshold_speed: f32,
    pub rest_damping: f32,
    pub min_separation_velocity: f32,
    pub collision_damping: f32,
    pub max_bodies: usize,
    pub drag_push_strength: f32,
    pub drag_push_fraction: f32,
    pub resize_deoverlap_iterations: usize,
    pub initial_bodies: usize,
    pub history_capacity: usize,
    pub throw_sample_window: usize,
    pub spawn_speed: f32,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            ground_friction: GROUND_FRICTION,
            bounce_damping: BOUNCE_DAMPING,
            max_throw_velocity: MAX_THROW_VELOCITY,
            velocity_multiplier: VELOCITY_MULTIPLIER,
            ball_radius: BALL_RADIUS,
            mass_density_factor: MASS_DENSITY_FACTOR,
            rest_threshold_speed: REST_THRESHOLD_SPEED,
            rest_damping: REST_DAMPING,
            min_separation_velocity: MIN_SEPARATION_VELOCITY,
            collision_damping: COLLISION_DAMPING,
            max_bodies: MAX_BODIES,
            drag_push_strength: DRAG_PUSH_STRENGTH,
            drag_push_fraction: DRAG_PUSH_FRACTION,
            resize_deoverlap_iterations: RESIZE_DEOVERLAP_ITERATIONS,
            initial_bodies: INITIAL_BODIES,
            history_capacity: HISTORY_CAPACITY,
            throw_sample_window: THROW_SAMPLE_WINDOW,
            spawn_speed: SPAWN_SPEED,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON document and validate the result.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject settings the simulation loop cannot recover from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // `!(x > 0.0)` also catches NaN
        if !(self.ball_radius > 0.0) || !self.ball_radius.is_finite() {
            return Err(ConfigError::NonPositiveRadius(self.ball_radius));
        }
        if !(self.mass_density_factor > 0.0) || !self.mass_density_factor.is_finite() {
            return Err(ConfigError::NonPositiveDensity(self.mass_density_factor));
        }
        let mass = self.mass_for_radius(self.ball_radius);
        if !mass.is_finite() {
            return Err(ConfigError::MassOverflow {
                radius: self.ball_radius,
                density: self.mass_density_factor,
            });
        }
        for (name, value) in [
            ("bounceDamping", self.bounce_damping),
            ("dragPushFraction", self.drag_push_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { name, value });
            }
        }
        for (name, value) in [
            ("friction", self.friction),
            ("groundFriction", self.ground_friction),
            ("restDamping", self.rest_damping),
            ("collisionDamping", self.collision_damping),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidFactor { name, value });
            }
        }
        for (name, value) in [
            ("gravity", self.gravity),
            ("velocityMultiplier", self.velocity_multiplier),
            ("restThresholdSpeed", self.rest_threshold_speed),
            ("minSeparationVelocity", self.min_separation_velocity),
            ("dragPushStrength", self.drag_push_strength),
            ("spawnSpeed", self.spawn_speed),
        ] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(ConfigError::Negative { name, value });
            }
            if value > MAX_PER_TICK {
                return Err(ConfigError::TooLarge {
                    name,
                    max: MAX_PER_TICK,
                    value,
                });
            }
        }
        if !(self.max_throw_velocity > 0.0) {
            return Err(ConfigError::NonPositiveMaxThrow(self.max_throw_velocity));
        }
        if self.max_throw_velocity > MAX_PER_TICK {
            return Err(ConfigError::TooLarge {
                name: "maxThrowVelocity",
                max: MAX_PER_TICK,
                value: self.max_throw_velocity,
            });
        }
        for (name, min, value) in [
            ("maxBodies", 1, self.max_bodies),
            ("historyCapacity", 1, self.history_capacity),
            ("throwSampleWindow", 2, self.throw_sample_window),
        ] {
            if value < min {
                return Err(ConfigError::TooSmall { name, min, value });
            }
        }
        Ok(())
    }

    /// Mass scales with disc area.
    pub fn mass_for_radius(&self, radius: f32) -> f32 {
        std::f32::consts::PI * radius * radius * self.mass_density_factor
    }
}
