//! Motion states and motion limits.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Joint position and velocity [rad, rad/s].
///
/// Used both for profile endpoints and for profile samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionState {
    pub position: f64,
    pub velocity: f64,
}

impl MotionState {
    /// At rest at zero.
    pub const REST: Self = Self {
        position: 0.0,
        velocity: 0.0,
    };

    pub const fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }

    /// At rest at `position`.
    pub const fn at_rest(position: f64) -> Self {
        Self {
            position,
            velocity: 0.0,
        }
    }

    /// Multiply position and velocity by `sign`.
    #[inline]
    pub fn scaled(self, sign: f64) -> Self {
        Self {
            position: self.position * sign,
            velocity: self.velocity * sign,
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

/// Velocity and acceleration caps of a trapezoidal profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionConstraints {
    /// Maximum velocity magnitude [rad/s], > 0.
    pub max_velocity: f64,
    /// Maximum acceleration magnitude [rad/s²], > 0.
    pub max_acceleration: f64,
}

impl MotionConstraints {
    pub const fn new(max_velocity: f64, max_acceleration: f64) -> Self {
        Self {
            max_velocity,
            max_acceleration,
        }
    }

    /// Both limits finite and strictly positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.max_velocity.is_finite()
            && self.max_velocity > 0.0
            && self.max_acceleration.is_finite()
            && self.max_acceleration > 0.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(format!(
                "constraints must be finite and > 0 (max_velocity={}, max_acceleration={})",
                self.max_velocity, self.max_acceleration
            )))
        }
    }
}
