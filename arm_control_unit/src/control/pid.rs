//! PID feedback with backward Euler integration, derivative filter (Tf),
//! anti-windup via back-calculation (Tt) and output clamp.
//!
//! Zero Ki disables integral; zero Kd disables derivative. The control loop
//! only depends on the [`FeedbackController`] contract; [`Pid`] is the
//! stock implementation.

use arm_common::arm::control::PidParameters;

/// Closed-loop correction primitive driven once per tick.
///
/// Implementations keep their own history (integral, previous error) across
/// calls; the caller supplies only the fresh setpoint and measurement.
pub trait FeedbackController {
    /// Correction for this tick.
    fn compute(&mut self, setpoint: f64, measured: f64, dt: f64) -> f64;

    /// Clear all accumulated history.
    fn reset(&mut self);
}

/// Internal state of the PID controller.
///
/// Preserves integral accumulator and filtered derivative across cycles.
#[derive(Debug, Clone, Copy, Default)]
pub struct PidState {
    /// Integral accumulator.
    integral: f64,
    /// Previous error (for derivative).
    prev_error: f64,
    /// Whether `prev_error` holds a real sample.
    primed: bool,
    /// Filtered derivative term (low-pass via Tf).
    derivative_filtered: f64,
    /// Previous raw (unsaturated) output, for anti-windup.
    prev_raw_output: f64,
}

impl PidState {
    /// Reset all internal state to zero.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current integral accumulator.
    #[inline]
    pub fn integral(&self) -> f64 {
        self.integral
    }
}

/// Compute one PID cycle using backward Euler integration.
///
/// # Arguments
/// - `state`: Mutable PID internal state.
/// - `gains`: PID parameters for this joint.
/// - `error`: Signed error (setpoint − measured) after action direction.
/// - `dt`: Tick period [s].
///
/// # Returns
/// PID output, clamped to `±out_max` when `out_max > 0`.
#[inline]
pub fn pid_compute(state: &mut PidState, gains: &PidParameters, error: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        return 0.0;
    }

    // ── P term ──────────────────────────────────────────────
    let p_term = gains.kp * error;

    // ── I term (backward Euler) ─────────────────────────────
    let i_term = if gains.ki != 0.0 {
        // Back-calculation: feed the previous saturation excess back into
        // the integral.
        let anti_windup = if gains.tt > 0.0 && gains.out_max > 0.0 {
            let saturated = state.prev_raw_output.clamp(-gains.out_max, gains.out_max);
            (saturated - state.prev_raw_output) / gains.tt
        } else {
            0.0
        };

        state.integral += (gains.ki * error + anti_windup) * dt;
        state.integral
    } else {
        state.integral = 0.0;
        0.0
    };

    // ── D term (with first-order filter) ────────────────────
    // No derivative kick on the first sample after a reset.
    let d_term = if gains.kd != 0.0 && state.primed {
        let raw_derivative = (error - state.prev_error) / dt;

        if gains.tf > 0.0 {
            let alpha = dt / (gains.tf + dt);
            state.derivative_filtered += alpha * (raw_derivative - state.derivative_filtered);
            gains.kd * state.derivative_filtered
        } else {
            gains.kd * raw_derivative
        }
    } else {
        state.derivative_filtered = 0.0;
        0.0
    };

    state.prev_error = error;
    state.primed = true;

    let raw_output = p_term + i_term + d_term;
    state.prev_raw_output = raw_output;

    if gains.out_max > 0.0 {
        raw_output.clamp(-gains.out_max, gains.out_max)
    } else {
        raw_output
    }
}

/// Stateful PID controller for one joint.
#[derive(Debug, Clone)]
pub struct Pid {
    params: PidParameters,
    state: PidState,
}

impl Pid {
    pub fn new(params: PidParameters) -> Self {
        Self {
            params,
            state: PidState::default(),
        }
    }

    pub fn state(&self) -> &PidState {
        &self.state
    }
}

impl FeedbackController for Pid {
    fn compute(&mut self, setpoint: f64, measured: f64, dt: f64) -> f64 {
        let error = self.params.action.sign() * (setpoint - measured);
        pid_compute(&mut self.state, &self.params, error, dt)
    }

    fn reset(&mut self) {
        self.state.reset();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
