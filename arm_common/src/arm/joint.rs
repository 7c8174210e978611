//! Joint identifiers and joint-space angle pairs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two actuated joints of the arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Joint {
    Shoulder,
    Wrist,
}

impl Joint {
    /// All joints in tick order.
    pub const ALL: [Joint; 2] = [Joint::Shoulder, Joint::Wrist];

    /// Array index used by per-joint storage.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Joint::Shoulder => 0,
            Joint::Wrist => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Joint::Shoulder => "shoulder",
            Joint::Wrist => "wrist",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A joint-space configuration `(shoulder, wrist)` in radians.
///
/// The wrist angle is relative to the upper link unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointAngles {
    pub shoulder: f64,
    pub wrist: f64,
}

impl JointAngles {
    pub const fn new(shoulder: f64, wrist: f64) -> Self {
        Self { shoulder, wrist }
    }

    /// Angle of the given joint.
    #[inline]
    pub const fn get(&self, joint: Joint) -> f64 {
        match joint {
            Joint::Shoulder => self.shoulder,
            Joint::Wrist => self.wrist,
        }
    }

    /// Euclidean distance in joint space.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> f64 {
        (self.shoulder - other.shoulder).hypot(self.wrist - other.wrist)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.shoulder.is_finite() && self.wrist.is_finite()
    }
}
