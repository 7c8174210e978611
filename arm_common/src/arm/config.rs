//! Arm configuration file layout.
//!
//! One TOML document describes the whole arm: shared service settings, loop
//! settings, link geometry and per-joint motion/feedforward/feedback tuning.
//! Loaded once at startup and immutable thereafter.
//!
//! ```toml
//! [shared]
//! service_name = "arm-cu-01"
//!
//! [control]
//! cycle_time_us = 16667
//! branch = "elbow_down"
//!
//! [geometry]
//! upper_length = 150.0
//! lower_length = 40.0
//!
//! [shoulder.constraints]
//! max_velocity = 2.0
//! max_acceleration = 1.0
//!
//! [wrist.constraints]
//! max_velocity = 4.0
//! max_acceleration = 2.0
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{CYCLE_TIME_US, CYCLE_TIME_US_MAX, CYCLE_TIME_US_MIN};

use super::control::{ActionDirection, AutoTuneConfig, FeedforwardGains, PidParameters};
use super::geometry::{ArmGeometry, BranchPolicy, WristReference};
use super::joint::Joint;
use super::motion::MotionConstraints;

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete arm configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArmConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub geometry: ArmGeometry,
    pub shoulder: JointConfig,
    pub wrist: JointConfig,
}

impl Default for ArmConfig {
    /// Reference tuning for a 150/40 arm driven in force units.
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            control: ControlConfig::default(),
            geometry: ArmGeometry::default(),
            shoulder: JointConfig {
                constraints: MotionConstraints::new(2.0, 1.0),
                feedforward: FeedforwardGains::new(0.0, 65000.0, 0.0, 0.0),
                feedback: PidParameters::pid(50000.0, 1000.0, 30000.0),
                auto_tune: None,
            },
            wrist: JointConfig {
                constraints: MotionConstraints::new(4.0, 2.0),
                feedforward: FeedforwardGains::default(),
                feedback: PidParameters::pid(70000.0, 10000.0, 2000.0),
                auto_tune: None,
            },
        }
    }
}

impl ArmConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.control.validate()?;
        self.geometry.validate()?;
        self.shoulder.validate(Joint::Shoulder)?;
        self.wrist.validate(Joint::Wrist)?;
        Ok(())
    }

    /// Tuning of one joint.
    pub fn joint(&self, joint: Joint) -> &JointConfig {
        match joint {
            Joint::Shoulder => &self.shoulder,
            Joint::Wrist => &self.wrist,
        }
    }
}

// ─── Loop Config ────────────────────────────────────────────────────

/// Control loop settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Nominal tick period in microseconds.
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,
    /// Kinematic branch selection.
    #[serde(default)]
    pub branch: BranchPolicy,
    /// Frame of the commanded wrist angle.
    #[serde(default)]
    pub wrist_reference: WristReference,
}

fn default_cycle_time_us() -> u32 {
    CYCLE_TIME_US
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            cycle_time_us: CYCLE_TIME_US,
            branch: BranchPolicy::default(),
            wrist_reference: WristReference::default(),
        }
    }
}

impl ControlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle_time_us < CYCLE_TIME_US_MIN || self.cycle_time_us > CYCLE_TIME_US_MAX {
            return Err(ConfigError::ValidationError(format!(
                "cycle_time_us {} out of range [{}, {}]",
                self.cycle_time_us, CYCLE_TIME_US_MIN, CYCLE_TIME_US_MAX
            )));
        }
        Ok(())
    }

    /// Nominal tick period [s].
    #[inline]
    pub fn cycle_time_secs(&self) -> f64 {
        self.cycle_time_us as f64 * 1e-6
    }
}

// ─── Joint Config ───────────────────────────────────────────────────

/// Motion limits and controller tuning for one joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointConfig {
    pub constraints: MotionConstraints,
    #[serde(default)]
    pub feedforward: FeedforwardGains,
    #[serde(default)]
    pub feedback: PidParameters,
    /// Gravity-gain auto-tuning; absent = disabled.
    #[serde(default)]
    pub auto_tune: Option<AutoTuneConfig>,
}

impl JointConfig {
    pub fn validate(&self, joint: Joint) -> Result<(), ConfigError> {
        let scoped = |e: ConfigError| match e {
            ConfigError::ValidationError(msg) => {
                ConfigError::ValidationError(format!("{joint}: {msg}"))
            }
            other => other,
        };
        self.constraints.validate().map_err(scoped)?;
        self.feedforward.validate().map_err(scoped)?;
        self.feedback.validate().map_err(scoped)?;
        if let Some(auto_tune) = &self.auto_tune {
            auto_tune.validate().map_err(scoped)?;
        }
        Ok(())
    }

    /// Whether the feedback controller inverts its error.
    #[inline]
    pub fn is_reverse_acting(&self) -> bool {
        self.feedback.action == ActionDirection::Reverse
    }
}
