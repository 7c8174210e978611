//! System-wide constants for the arm workspace.
//!
//! Single source of truth for numeric limits and defaults.

/// Default control cycle time in microseconds (60 Hz).
pub const CYCLE_TIME_US: u32 = 16_667;

/// Minimum accepted control cycle time in microseconds (1 kHz).
pub const CYCLE_TIME_US_MIN: u32 = 1_000;

/// Maximum accepted control cycle time in microseconds (1 Hz).
pub const CYCLE_TIME_US_MAX: u32 = 1_000_000;

/// Number of telemetry samples retained per joint (8 s at 60 Hz).
pub const TELEMETRY_HISTORY_LEN: usize = 480;

/// Distance below which a profile's inverse time query reports "already there".
pub const POSITION_EPSILON: f64 = 1e-6;

/// Default upper (shoulder) link length.
pub const DEFAULT_UPPER_LENGTH: f64 = 150.0;

/// Default lower (wrist) link length.
pub const DEFAULT_LOWER_LENGTH: f64 = 40.0;
