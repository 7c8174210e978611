//! Planar geometry of the two-link chain.
//!
//! The shoulder joint sits at the origin of the kinematic frame. Targets are
//! expressed in that frame; the reachable workspace is the annulus
//! `[|L1 - L2|, L1 + L2]`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::consts::{DEFAULT_LOWER_LENGTH, DEFAULT_UPPER_LENGTH};

// ─── Point2D ────────────────────────────────────────────────────────

/// End-effector position in the arm base frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// The arm base.
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from the base.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Polar angle of the point [rad], in `(-π, π]`.
    #[inline]
    pub fn polar_angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    #[inline]
    pub fn is_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Error returned when parsing a `"x,y"` point string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParsePointError {
    #[error("expected \"x,y\", got {0:?}")]
    Format(String),
    #[error("invalid coordinate {0:?}")]
    Coordinate(String),
}

impl FromStr for Point2D {
    type Err = ParsePointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| ParsePointError::Format(s.to_string()))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| ParsePointError::Coordinate(v.trim().to_string()))
        };
        Ok(Self::new(parse(x)?, parse(y)?))
    }
}

// ─── ArmGeometry ────────────────────────────────────────────────────

/// Link lengths of the two-link arm.
///
/// Configured once at startup and immutable thereafter. Both lengths must be
/// finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmGeometry {
    /// Shoulder-to-elbow link length.
    pub upper_length: f64,
    /// Elbow-to-end-effector link length.
    pub lower_length: f64,
}

impl Default for ArmGeometry {
    fn default() -> Self {
        Self {
            upper_length: DEFAULT_UPPER_LENGTH,
            lower_length: DEFAULT_LOWER_LENGTH,
        }
    }
}

impl ArmGeometry {
    /// Create a validated geometry.
    pub fn new(upper_length: f64, lower_length: f64) -> Result<Self, ConfigError> {
        let geometry = Self {
            upper_length,
            lower_length,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    /// Validate link lengths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("upper_length", self.upper_length),
            ("lower_length", self.lower_length),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "geometry.{name} must be finite and > 0, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Inner radius of the reachable annulus.
    #[inline]
    pub fn min_reach(&self) -> f64 {
        (self.upper_length - self.lower_length).abs()
    }

    /// Outer radius of the reachable annulus.
    #[inline]
    pub fn max_reach(&self) -> f64 {
        self.upper_length + self.lower_length
    }

    /// Whether a target at `distance` from the base lies inside the annulus.
    #[inline]
    pub fn is_reachable(&self, distance: f64) -> bool {
        distance >= self.min_reach() && distance <= self.max_reach()
    }
}

// ─── Branch selection ───────────────────────────────────────────────

/// One of the two elbow configurations reaching the same end-effector point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElbowBranch {
    /// Wrist angle in `[0, π]`; the elbow sits clockwise of the target ray.
    ElbowDown,
    /// Wrist angle in `[-π, 0]`; mirror image of [`ElbowBranch::ElbowDown`].
    ElbowUp,
}

/// How the controller picks a branch from a two-solution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchPolicy {
    /// Always the positive-wrist solution.
    #[default]
    ElbowDown,
    /// Always the negative-wrist solution.
    ElbowUp,
    /// The solution closest in joint space to the measured joint angles.
    Nearest,
}

/// Frame in which the wrist angle is commanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WristReference {
    /// Wrist angle relative to the upper link (`q2`).
    #[default]
    Relative,
    /// Wrist angle relative to the base frame (`q1 + q2`).
    Absolute,
}
