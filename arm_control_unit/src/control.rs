//! Control engine root.
//!
//! Per-joint position control: trapezoidal profile → arm feedforward + PID.
//! Feedforward and feedback components deactivate when their gains are zero.

pub mod estimator;
pub mod feedforward;
pub mod joint;
pub mod pid;
pub mod profile;
