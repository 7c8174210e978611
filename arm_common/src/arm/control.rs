//! Feedforward and feedback parameter types.
//!
//! Zero gains disable the corresponding term. All types deserialize with
//! `#[serde(default)]` so a joint section only lists the gains it uses.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

// ─── Feedforward ────────────────────────────────────────────────────

/// Optional saturation applied to the total feedforward output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputRange {
    pub min: f64,
    pub max: f64,
}

impl OutputRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `value` into `[min, max]`.
    ///
    /// Never panics: an inverted range yields `max`, NaN bounds are ignored.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min > self.max {
            return Err(ConfigError::ValidationError(format!(
                "output_range requires finite min <= max, got [{}, {}]",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Arm feedforward gains.
///
/// ```text
/// ff = s·sign(v) + g·cos(θ) + kv·v + ka·a
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedforwardGains {
    /// Static friction offset (0 = disabled).
    #[serde(default)]
    pub static_friction: f64,
    /// Gravity compensation at horizontal (0 = disabled).
    #[serde(default)]
    pub gravity: f64,
    /// Viscous friction / velocity gain (0 = disabled).
    #[serde(default)]
    pub velocity_gain: f64,
    /// Inertia / acceleration gain (0 = disabled).
    #[serde(default)]
    pub acceleration_gain: f64,
    /// Clamp on the total output.
    #[serde(default)]
    pub output_range: Option<OutputRange>,
}

impl FeedforwardGains {
    pub const fn new(
        static_friction: f64,
        gravity: f64,
        velocity_gain: f64,
        acceleration_gain: f64,
    ) -> Self {
        Self {
            static_friction,
            gravity,
            velocity_gain,
            acceleration_gain,
            output_range: None,
        }
    }

    /// Builder-style output clamp.
    pub const fn with_output_range(mut self, min: f64, max: f64) -> Self {
        self.output_range = Some(OutputRange::new(min, max));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("static_friction", self.static_friction),
            ("gravity", self.gravity),
            ("velocity_gain", self.velocity_gain),
            ("acceleration_gain", self.acceleration_gain),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "feedforward.{name} must be finite, got {value}"
                )));
            }
        }
        if let Some(range) = &self.output_range {
            range.validate()?;
        }
        Ok(())
    }
}

/// Gravity-gain auto-tuning step sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoTuneConfig {
    /// Gain increase when the joint did not move between ticks.
    #[serde(default = "default_step_up")]
    pub step_up: f64,
    /// Gain decrease while the joint sits above horizontal.
    #[serde(default = "default_step_down")]
    pub step_down: f64,
    /// Position delta resolution [rad]; smaller deltas count as "not moving".
    #[serde(default = "default_resolution")]
    pub resolution: f64,
}

fn default_step_up() -> f64 {
    10.0
}

fn default_step_down() -> f64 {
    1.0
}

fn default_resolution() -> f64 {
    1e-4
}

impl Default for AutoTuneConfig {
    fn default() -> Self {
        Self {
            step_up: default_step_up(),
            step_down: default_step_down(),
            resolution: default_resolution(),
        }
    }
}

impl AutoTuneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step_up.is_finite() && self.step_down.is_finite()) {
            return Err(ConfigError::ValidationError(
                "auto_tune steps must be finite".to_string(),
            ));
        }
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "auto_tune.resolution must be > 0, got {}",
                self.resolution
            )));
        }
        Ok(())
    }
}

// ─── Feedback ───────────────────────────────────────────────────────

/// Sign convention of the feedback controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionDirection {
    /// Positive error (setpoint above measurement) drives positive output.
    #[default]
    Direct,
    /// Positive error drives negative output.
    Reverse,
}

impl ActionDirection {
    #[inline]
    pub const fn sign(self) -> f64 {
        match self {
            ActionDirection::Direct => 1.0,
            ActionDirection::Reverse => -1.0,
        }
    }
}

/// PID parameters for one joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidParameters {
    /// Proportional gain.
    #[serde(default)]
    pub kp: f64,
    /// Integral gain (0 = disabled).
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain (0 = disabled).
    #[serde(default)]
    pub kd: f64,
    /// Derivative filter time constant [s] (0 = unfiltered).
    #[serde(default)]
    pub tf: f64,
    /// Anti-windup tracking time constant [s] (0 = disabled).
    #[serde(default)]
    pub tt: f64,
    /// Output saturation limit (0 = unlimited).
    #[serde(default)]
    pub out_max: f64,
    /// Action direction.
    #[serde(default)]
    pub action: ActionDirection,
}

impl Default for PidParameters {
    fn default() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            tf: 0.0,
            tt: 0.0,
            out_max: 0.0,
            action: ActionDirection::Direct,
        }
    }
}

impl PidParameters {
    /// P/I/D gains with every other field at its default.
    pub fn pid(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("kp", self.kp),
            ("ki", self.ki),
            ("kd", self.kd),
            ("tf", self.tf),
            ("tt", self.tt),
            ("out_max", self.out_max),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "feedback.{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }
}
