//! Arm Common Library
//!
//! Shared plain-data types and configuration loading for the two-link arm
//! control workspace.
//!
//! # Module Structure
//!
//! - [`arm`] - Geometry, motion and control parameter types, plus the arm
//!   configuration file layout
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Workspace-wide numeric limits and defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use arm_common::prelude::*;
//!
//! let geometry = ArmGeometry::new(150.0, 40.0).unwrap();
//! assert_eq!(geometry.max_reach(), 190.0);
//! ```

pub mod arm;
pub mod config;
pub mod consts;
pub mod prelude;
