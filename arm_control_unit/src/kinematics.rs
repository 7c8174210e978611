//! Two-link planar inverse kinematics.
//!
//! Closed-form law-of-cosines solution for a shoulder at the origin and two
//! rigid links. Every reachable target yields two labelled solutions
//! ([`ElbowBranch::ElbowDown`] and [`ElbowBranch::ElbowUp`]); picking one is
//! the caller's decision, see [`JointSolutions::select`].
//!
//! ```text
//! d  = |target|
//! q2 = acos((d² − L1² − L2²) / (2·L1·L2))            ∈ [0, π]
//! q1 = atan2(y, x) ∓ atan2(L2·sin q2, L1 + L2·cos q2)
//! ```

use arm_common::arm::geometry::{ArmGeometry, BranchPolicy, ElbowBranch, Point2D};
use arm_common::arm::joint::JointAngles;
use thiserror::Error;

/// Reasons a target has no joint-space solution.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum KinematicsError {
    /// Target at the base origin or non-finite; the polar angle is undefined.
    #[error("degenerate target {0}: must be finite and away from the base origin")]
    DegenerateTarget(Point2D),

    /// Target outside the reachable annulus.
    #[error("target {target} unreachable: distance {distance:.3} outside [{min_reach:.3}, {max_reach:.3}]")]
    Unreachable {
        target: Point2D,
        distance: f64,
        min_reach: f64,
        max_reach: f64,
    },
}

/// Both joint-space solutions for one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSolutions {
    /// Positive wrist angle.
    pub elbow_down: JointAngles,
    /// Negative wrist angle.
    pub elbow_up: JointAngles,
}

impl JointSolutions {
    /// Solution for an explicit branch.
    #[inline]
    pub fn get(&self, branch: ElbowBranch) -> JointAngles {
        match branch {
            ElbowBranch::ElbowDown => self.elbow_down,
            ElbowBranch::ElbowUp => self.elbow_up,
        }
    }

    /// Branch whose joint angles are closest to `reference`.
    ///
    /// Ties (fully extended or fully folded arm) resolve to `ElbowDown`.
    pub fn nearest_to(&self, reference: &JointAngles) -> ElbowBranch {
        if self.elbow_up.distance_to(reference) < self.elbow_down.distance_to(reference) {
            ElbowBranch::ElbowUp
        } else {
            ElbowBranch::ElbowDown
        }
    }

    /// Apply a branch policy. `current` is only consulted by
    /// [`BranchPolicy::Nearest`].
    pub fn select(&self, policy: BranchPolicy, current: &JointAngles) -> (ElbowBranch, JointAngles) {
        let branch = match policy {
            BranchPolicy::ElbowDown => ElbowBranch::ElbowDown,
            BranchPolicy::ElbowUp => ElbowBranch::ElbowUp,
            BranchPolicy::Nearest => self.nearest_to(current),
        };
        (branch, self.get(branch))
    }
}

/// Solve the inverse kinematics for `target`.
///
/// # Errors
/// - [`KinematicsError::DegenerateTarget`] for the origin or non-finite input.
/// - [`KinematicsError::Unreachable`] outside `[|L1 − L2|, L1 + L2]`.
pub fn solve(target: Point2D, geometry: &ArmGeometry) -> Result<JointSolutions, KinematicsError> {
    if !target.is_finite() || target.is_origin() {
        return Err(KinematicsError::DegenerateTarget(target));
    }

    let distance = target.norm();
    if !geometry.is_reachable(distance) {
        return Err(KinematicsError::Unreachable {
            target,
            distance,
            min_reach: geometry.min_reach(),
            max_reach: geometry.max_reach(),
        });
    }

    let l1 = geometry.upper_length;
    let l2 = geometry.lower_length;

    // Rounding at the annulus edges can push the cosine just past ±1.
    let cos_q2 = ((distance * distance - l1 * l1 - l2 * l2) / (2.0 * l1 * l2)).clamp(-1.0, 1.0);
    let q2 = cos_q2.acos();

    let bearing = target.polar_angle();
    let interior = (l2 * q2.sin()).atan2(l1 + l2 * cos_q2);

    Ok(JointSolutions {
        elbow_down: JointAngles::new(bearing - interior, q2),
        elbow_up: JointAngles::new(bearing + interior, -q2),
    })
}

/// End-effector position reached by `angles` (wrist relative to upper link).
pub fn forward(angles: &JointAngles, geometry: &ArmGeometry) -> Point2D {
    let absolute_wrist = angles.shoulder + angles.wrist;
    Point2D::new(
        geometry.upper_length * angles.shoulder.cos() + geometry.lower_length * absolute_wrist.cos(),
        geometry.upper_length * angles.shoulder.sin() + geometry.lower_length * absolute_wrist.sin(),
    )
}

// ─── Tests ──────────────────────────────────────────────────────────
