//! Arm feedforward model.
//!
//! Static friction (s × sign(velocity)), gravity (g × cos(position)),
//! viscous friction (kv × velocity) and inertia (ka × acceleration).
//! Zero gains disable each component; an optional clamp bounds the total.

use arm_common::arm::control::FeedforwardGains;
use arm_common::config::ConfigError;

/// `sign(0) = 0`, so static friction contributes nothing at standstill.
#[inline]
fn signum_or_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value.signum() }
}

/// Compute the arm feedforward contribution.
///
/// ```text
/// ff = s × sign(v) + g × cos(θ) + kv × v + ka × a
/// ```
///
/// The clamp, when configured, applies to the total rather than per term.
///
/// # Arguments
/// - `gains`: Feedforward gains for this joint.
/// - `position`: Joint angle [rad], 0 = horizontal.
/// - `velocity`: Joint velocity [rad/s].
/// - `acceleration`: Joint acceleration [rad/s²].
#[inline]
pub fn feedforward_compute(
    gains: &FeedforwardGains,
    position: f64,
    velocity: f64,
    acceleration: f64,
) -> f64 {
    let mut output = 0.0;

    if gains.static_friction != 0.0 {
        output += gains.static_friction * signum_or_zero(velocity);
    }

    if gains.gravity != 0.0 {
        output += gains.gravity * position.cos();
    }

    if gains.velocity_gain != 0.0 {
        output += gains.velocity_gain * velocity;
    }

    if gains.acceleration_gain != 0.0 {
        output += gains.acceleration_gain * acceleration;
    }

    match &gains.output_range {
        Some(range) => range.clamp(output),
        None => output,
    }
}

/// Feedforward model for one arm joint.
///
/// Holds the gains so the gravity term can be nudged by an estimator at
/// runtime (see [`super::estimator`]). Everything else is read-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmFeedforward {
    gains: FeedforwardGains,
}

impl ArmFeedforward {
    /// # Errors
    /// [`ConfigError::ValidationError`] for non-finite gains or an invalid
    /// output range.
    pub fn new(gains: FeedforwardGains) -> Result<Self, ConfigError> {
        gains.validate()?;
        Ok(Self { gains })
    }

    pub fn gains(&self) -> &FeedforwardGains {
        &self.gains
    }

    /// Feedforward output for the given joint state.
    #[inline]
    pub fn calculate(&self, position: f64, velocity: f64, acceleration: f64) -> f64 {
        feedforward_compute(&self.gains, position, velocity, acceleration)
    }

    /// Add `delta` to the gravity gain.
    pub fn apply_gravity_delta(&mut self, delta: f64) {
        self.gains.gravity += delta;
    }

    /// Highest velocity reachable with `max_actuation` at `angle` while
    /// accelerating at `acceleration`. `None` when the velocity gain is zero
    /// (velocity unbounded by actuation).
    pub fn max_achievable_velocity(
        &self,
        max_actuation: f64,
        angle: f64,
        acceleration: f64,
    ) -> Option<f64> {
        let g = &self.gains;
        if g.velocity_gain == 0.0 {
            return None;
        }
        // Assume max velocity is positive, so static friction opposes it.
        Some(
            (max_actuation
                - g.static_friction
                - angle.cos() * g.gravity
                - acceleration * g.acceleration_gain)
                / g.velocity_gain,
        )
    }

    /// Lowest (most negative) velocity reachable. `None` when the velocity
    /// gain is zero.
    pub fn min_achievable_velocity(
        &self,
        max_actuation: f64,
        angle: f64,
        acceleration: f64,
    ) -> Option<f64> {
        let g = &self.gains;
        if g.velocity_gain == 0.0 {
            return None;
        }
        // Assume min velocity is negative, so static friction aids it.
        Some(
            (-max_actuation + g.static_friction
                - angle.cos() * g.gravity
                - acceleration * g.acceleration_gain)
                / g.velocity_gain,
        )
    }

    /// Highest acceleration reachable at `angle` and `velocity`. `None` when
    /// the acceleration gain is zero.
    pub fn max_achievable_acceleration(
        &self,
        max_actuation: f64,
        angle: f64,
        velocity: f64,
    ) -> Option<f64> {
        let g = &self.gains;
        if g.acceleration_gain == 0.0 {
            return None;
        }
        Some(
            (max_actuation
                - g.static_friction * signum_or_zero(velocity)
                - angle.cos() * g.gravity
                - velocity * g.velocity_gain)
                / g.acceleration_gain,
        )
    }

    /// Lowest (most negative) acceleration reachable. `None` when the
    /// acceleration gain is zero.
    pub fn min_achievable_acceleration(
        &self,
        max_actuation: f64,
        angle: f64,
        velocity: f64,
    ) -> Option<f64> {
        self.max_achievable_acceleration(-max_actuation, angle, velocity)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
