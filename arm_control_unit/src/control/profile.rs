//! Trapezoidal motion profile.
//!
//! Closed-form, time-indexed trajectory between two [`MotionState`]s with
//! bounded velocity and acceleration. The profile accelerates at
//! `max_acceleration`, cruises at `max_velocity`, then decelerates onto the
//! goal. When the distance is too short to reach `max_velocity` the cruise
//! phase vanishes and the velocity curve becomes a triangle.
//!
//! Internally both endpoints are normalized so that motion is always in the
//! positive direction; every query result is de-normalized before returning.
//!
//! ```text
//!  v
//!  │    ┌──────────┐
//!  │   ╱            ╲
//!  │  ╱              ╲
//!  └─┴───┴──────────┴──╴ t
//!    0  end_accel  end_cruise  end_decel = total
//! ```

use arm_common::arm::motion::{MotionConstraints, MotionState};
use arm_common::consts::POSITION_EPSILON;
use thiserror::Error;
use tracing::trace;

/// Rejected profile inputs.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProfileError {
    #[error(
        "invalid constraints: max_velocity={max_velocity}, max_acceleration={max_acceleration} (both must be finite and > 0)"
    )]
    InvalidConstraints {
        max_velocity: f64,
        max_acceleration: f64,
    },

    #[error("non-finite {which} state: position={position}, velocity={velocity}")]
    NonFiniteState {
        which: &'static str,
        position: f64,
        velocity: f64,
    },
}

fn check_state(which: &'static str, state: &MotionState) -> Result<(), ProfileError> {
    if state.is_finite() {
        Ok(())
    } else {
        Err(ProfileError::NonFiniteState {
            which,
            position: state.position,
            velocity: state.velocity,
        })
    }
}

/// Immutable trapezoidal profile from `initial` to `goal`.
///
/// A new goal requires a new profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrapezoidProfile {
    constraints: MotionConstraints,
    /// `-1` when the goal lies behind the initial position, else `+1`.
    direction: f64,
    /// Initial state in the normalized frame (velocity capped).
    initial: MotionState,
    /// Goal state in the normalized frame.
    goal: MotionState,
    /// Goal exactly as requested; returned verbatim once finished.
    goal_raw: MotionState,
    end_accel: f64,
    end_cruise: f64,
    end_decel: f64,
}

impl TrapezoidProfile {
    /// Build a profile from `initial` to `goal`.
    ///
    /// The initial velocity must be stoppable before the goal. When it is
    /// not (stopping distance `v²/(2a)` exceeds the remaining distance), the
    /// acceleration phase ends before `t = 0` and the profile starts partway
    /// through its deceleration: `calculate(0)` then differs from `initial`,
    /// though the goal is still reached at `total_time()`.
    ///
    /// # Errors
    /// [`ProfileError`] for non-positive/non-finite constraints or states.
    pub fn new(
        constraints: MotionConstraints,
        goal: MotionState,
        initial: MotionState,
    ) -> Result<Self, ProfileError> {
        if !constraints.is_valid() {
            return Err(ProfileError::InvalidConstraints {
                max_velocity: constraints.max_velocity,
                max_acceleration: constraints.max_acceleration,
            });
        }
        check_state("goal", &goal)?;
        check_state("initial", &initial)?;

        let direction = if initial.position > goal.position { -1.0 } else { 1.0 };
        let mut initial_n = initial.scaled(direction);
        let goal_n = goal.scaled(direction);

        let max_v = constraints.max_velocity;
        let max_a = constraints.max_acceleration;

        if initial_n.velocity > max_v {
            initial_n.velocity = max_v;
        }

        // Distance already covered by the endpoint velocities, measured as
        // if each ramp started/ended at rest.
        let cutoff_begin = initial_n.velocity / max_a;
        let cutoff_dist_begin = cutoff_begin * cutoff_begin * max_a / 2.0;

        let cutoff_end = goal_n.velocity / max_a;
        let cutoff_dist_end = cutoff_end * cutoff_end * max_a / 2.0;

        let full_trapezoid_dist =
            cutoff_dist_begin + (goal_n.position - initial_n.position) + cutoff_dist_end;

        let mut accel_time = max_v / max_a;
        let mut cruise_dist = full_trapezoid_dist - accel_time * accel_time * max_a;

        // Too short to reach max velocity: triangular profile.
        if cruise_dist < 0.0 {
            accel_time = (full_trapezoid_dist / max_a).sqrt();
            cruise_dist = 0.0;
        }

        let end_accel = accel_time - cutoff_begin;
        let end_cruise = end_accel + cruise_dist / max_v;
        let end_decel = end_cruise + accel_time - cutoff_end;

        trace!(
            direction,
            end_accel, end_cruise, end_decel, "trapezoid profile constructed"
        );

        Ok(Self {
            constraints,
            direction,
            initial: initial_n,
            goal: goal_n,
            goal_raw: goal,
            end_accel,
            end_cruise,
            end_decel,
        })
    }

    /// Profile starting at rest at zero.
    pub fn to_goal(constraints: MotionConstraints, goal: MotionState) -> Result<Self, ProfileError> {
        Self::new(constraints, goal, MotionState::REST)
    }

    /// Sample the profile `t` seconds after its start.
    ///
    /// For `t >= total_time()` the goal is returned exactly. `calculate(0)`
    /// equals `initial` only when the initial velocity does not overshoot
    /// the goal (see [`TrapezoidProfile::new`]).
    pub fn calculate(&self, t: f64) -> MotionState {
        if t >= self.end_decel {
            return self.goal_raw;
        }

        let max_v = self.constraints.max_velocity;
        let max_a = self.constraints.max_acceleration;
        let v0 = self.initial.velocity;

        let result = if t < self.end_accel {
            MotionState {
                position: self.initial.position + (v0 + t * max_a / 2.0) * t,
                velocity: v0 + t * max_a,
            }
        } else if t < self.end_cruise {
            MotionState {
                position: self.initial.position
                    + (v0 + self.end_accel * max_a / 2.0) * self.end_accel
                    + max_v * (t - self.end_accel),
                velocity: max_v,
            }
        } else {
            let time_left = self.end_decel - t;
            MotionState {
                position: self.goal.position
                    - (self.goal.velocity + time_left * max_a / 2.0) * time_left,
                velocity: self.goal.velocity + time_left * max_a,
            }
        };

        result.scaled(self.direction)
    }

    /// Time from the profile start until `target` is reached.
    ///
    /// Re-derives the acceleration/cruise/deceleration split against
    /// `target` instead of the goal. Phases only count when `target` lies on
    /// the profile's side of the initial position; the initial velocity is
    /// projected onto the direction of `target`. Returns `0` when the target
    /// is within [`POSITION_EPSILON`] of the initial position.
    ///
    /// Only meaningful for positions the profile actually passes through; a
    /// target behind the start yields a negative time.
    pub fn time_left_until(&self, target: f64) -> f64 {
        let position = self.initial.position * self.direction;
        let velocity = self.initial.velocity * self.direction;

        let toward = if target < position { -1.0 } else { 1.0 };
        let velocity = velocity * toward;

        let (end_accel, end_cruise) = if toward == self.direction {
            (
                self.end_accel.max(0.0),
                (self.end_cruise - self.end_accel).max(0.0),
            )
        } else {
            (0.0, 0.0)
        };

        let max_v = self.constraints.max_velocity;
        let acceleration = self.constraints.max_acceleration;
        let deceleration = -acceleration;

        let dist_to_target = (target - position).abs();
        if dist_to_target < POSITION_EPSILON {
            return 0.0;
        }

        let mut accel_dist = velocity * end_accel + 0.5 * acceleration * end_accel * end_accel;

        let decel_velocity = if end_accel > 0.0 {
            (velocity * velocity + 2.0 * acceleration * accel_dist).abs().sqrt()
        } else {
            velocity
        };

        let mut cruise_dist = max_v * end_cruise;
        let decel_dist;

        if accel_dist > dist_to_target {
            accel_dist = dist_to_target;
            cruise_dist = 0.0;
            decel_dist = 0.0;
        } else if accel_dist + cruise_dist > dist_to_target {
            cruise_dist = dist_to_target - accel_dist;
            decel_dist = 0.0;
        } else {
            decel_dist = dist_to_target - cruise_dist - accel_dist;
        }

        let accel_time = (-velocity
            + (velocity * velocity + 2.0 * acceleration * accel_dist).abs().sqrt())
            / acceleration;

        let decel_time = (-decel_velocity
            + (decel_velocity * decel_velocity + 2.0 * deceleration * decel_dist)
                .abs()
                .sqrt())
            / deceleration;

        let cruise_time = cruise_dist / max_v;

        accel_time + cruise_time + decel_time
    }

    /// Whether `t` is at or past the end of the profile.
    #[inline]
    pub fn is_finished(&self, t: f64) -> bool {
        t >= self.total_time()
    }

    /// Total duration [s].
    #[inline]
    pub fn total_time(&self) -> f64 {
        self.end_decel
    }

    /// End of the acceleration phase [s].
    #[inline]
    pub fn end_of_acceleration(&self) -> f64 {
        self.end_accel
    }

    /// End of the cruise phase [s].
    #[inline]
    pub fn end_of_cruise(&self) -> f64 {
        self.end_cruise
    }

    /// `-1.0` for a profile moving toward smaller positions, else `1.0`.
    #[inline]
    pub fn direction(&self) -> f64 {
        self.direction
    }

    /// Initial state in caller coordinates (velocity capped).
    pub fn initial(&self) -> MotionState {
        self.initial.scaled(self.direction)
    }

    /// Goal state in caller coordinates.
    pub fn goal(&self) -> MotionState {
        self.goal_raw
    }

    pub fn constraints(&self) -> &MotionConstraints {
        &self.constraints
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
