//! # Arm Control Unit Library
//!
//! Position control for a two-link planar arm: end-effector targets are
//! solved into joint angles, each joint follows a trapezoidal motion profile,
//! and every tick the arm feedforward model plus a PID correction produce the
//! actuator command.
//!
//! ## Layers
//!
//! 1. **Kinematics** ([`kinematics`]) — target point → two joint solutions
//! 2. **Profiles** ([`control::profile`]) — bounded-velocity/acceleration
//!    trajectories per joint
//! 3. **Joint loop** ([`control::joint`]) — setpoint → feedforward + feedback
//! 4. **Arm** ([`arm`]) — retargeting and both joints in lockstep
//! 5. **Cycle** ([`cycle`]) — clock, actuator I/O, target mailbox, telemetry
//!
//! ```rust
//! use arm_common::prelude::*;
//! use arm_control_unit::arm::ArmController;
//!
//! let mut arm = ArmController::new(&ArmConfig::default()).unwrap();
//! arm.command_target(Point2D::new(150.0, 40.0), &JointAngles::default()).unwrap();
//! let tick = arm.tick(&JointAngles::default(), 1.0 / 60.0);
//! assert_eq!(tick.shoulder.setpoint.position, 0.0);
//! ```

pub mod arm;
pub mod command;
pub mod config;
pub mod control;
pub mod cycle;
pub mod error;
pub mod kinematics;
pub mod telemetry;
