//! Arm-specific shared types.
//!
//! Plain data exchanged between the configuration layer and the control unit:
//! link geometry, joint identifiers and angles, motion states and limits,
//! feedforward/feedback parameters and the full arm configuration file.

pub mod config;
pub mod control;
pub mod geometry;
pub mod joint;
pub mod motion;
