//! Prelude module for common re-exports.
//!
//! ```rust
//! use arm_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::arm::config::{ArmConfig, ControlConfig, JointConfig};
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── Arm Types ──────────────────────────────────────────────────────
pub use crate::arm::control::{
    ActionDirection, AutoTuneConfig, FeedforwardGains, OutputRange, PidParameters,
};
pub use crate::arm::geometry::{ArmGeometry, BranchPolicy, ElbowBranch, Point2D, WristReference};
pub use crate::arm::joint::{Joint, JointAngles};
pub use crate::arm::motion::{MotionConstraints, MotionState};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME_US, POSITION_EPSILON, TELEMETRY_HISTORY_LEN};
