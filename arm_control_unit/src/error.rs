//! Error aggregation for the control unit.

use arm_common::config::ConfigError;
use thiserror::Error;

use crate::control::profile::ProfileError;
use crate::kinematics::KinematicsError;

/// Any failure surfaced by the arm controller or its setup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArmError {
    #[error("kinematics: {0}")]
    Kinematics(#[from] KinematicsError),

    #[error("profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

impl ArmError {
    /// The commanded target cannot be reached; the previous motion continues.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ArmError::Kinematics(KinematicsError::Unreachable { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arm_common::arm::geometry::Point2D;

    #[test]
    fn display_includes_source() {
        let err: ArmError = KinematicsError::Unreachable {
            target: Point2D::new(300.0, 0.0),
            distance: 300.0,
            min_reach: 110.0,
            max_reach: 190.0,
        }
        .into();
        let msg = err.to_string();
        assert!(msg.starts_with("kinematics:"));
        assert!(msg.contains("300.000"));
        assert!(err.is_unreachable());
    }

    #[test]
    fn config_errors_convert() {
        let err: ArmError = ConfigError::ValidationError("bad".into()).into();
        assert!(!err.is_unreachable());
        assert_eq!(err.to_string(), "config: Configuration validation failed: bad");
    }
}
