//! Per-joint control loop: profile sampling, feedforward and feedback.
//!
//! [`JointLoopState`] holds everything that changes tick to tick (active
//! profile, elapsed time, last setpoint). [`JointController`] holds the
//! models and the feedback controller. The split lets the arm controller
//! build and validate new profiles for both joints before touching either
//! state.

use arm_common::arm::config::JointConfig;
use arm_common::arm::joint::Joint;
use arm_common::arm::motion::{MotionConstraints, MotionState};
use arm_common::config::ConfigError;
use serde::Serialize;
use tracing::{debug, trace};

use super::estimator::{GainEstimator, GravityGainEstimator};
use super::feedforward::ArmFeedforward;
use super::pid::{FeedbackController, Pid};
use super::profile::{ProfileError, TrapezoidProfile};

// ─── JointLoopState ─────────────────────────────────────────────────

/// Mutable loop state for one joint.
///
/// Without an active profile the joint holds `last_setpoint` at zero
/// velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointLoopState {
    profile: Option<TrapezoidProfile>,
    /// Time since the active profile started [s].
    elapsed: f64,
    last_setpoint: MotionState,
    finished: bool,
}

impl JointLoopState {
    /// State holding `position` with no profile.
    pub fn holding(position: f64) -> Self {
        Self {
            last_setpoint: MotionState::at_rest(position),
            ..Self::default()
        }
    }

    /// Replace any in-flight profile and restart the clock.
    pub fn start(&mut self, profile: TrapezoidProfile) {
        self.finished = profile.is_finished(0.0);
        if self.finished {
            self.last_setpoint = profile.goal();
        }
        self.profile = Some(profile);
        self.elapsed = 0.0;
    }

    /// Drop the profile and hold `position`.
    pub fn hold(&mut self, position: f64) {
        *self = Self::holding(position);
    }

    pub fn profile(&self) -> Option<&TrapezoidProfile> {
        self.profile.as_ref()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn last_setpoint(&self) -> MotionState {
        self.last_setpoint
    }

    /// A profile exists and its goal has been issued as the setpoint.
    pub fn is_finished(&self) -> bool {
        self.profile.is_some() && self.finished
    }

    /// Next setpoint; advances the profile clock by `dt` until finished.
    ///
    /// `finished` is taken from the sampled time, so it is only set on the
    /// tick that returns the goal.
    fn advance(&mut self, dt: f64) -> MotionState {
        let setpoint = match &self.profile {
            Some(profile) => {
                let sample = profile.calculate(self.elapsed);
                self.finished = profile.is_finished(self.elapsed);
                if !self.finished {
                    self.elapsed += dt.max(0.0);
                }
                sample
            }
            None => MotionState::at_rest(self.last_setpoint.position),
        };
        self.last_setpoint = setpoint;
        setpoint
    }
}

// ─── JointTick ──────────────────────────────────────────────────────

/// Output of one joint tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct JointTick {
    /// Profile sample (or held setpoint) used this tick.
    pub setpoint: MotionState,
    /// Measured joint angle [rad].
    pub measured: f64,
    pub feedforward: f64,
    pub feedback: f64,
    /// `feedforward + feedback`, sent to the actuator.
    pub command: f64,
}

// ─── JointController ────────────────────────────────────────────────

/// Control models for one joint.
#[derive(Debug, Clone)]
pub struct JointController<F: FeedbackController = Pid> {
    joint: Joint,
    constraints: MotionConstraints,
    feedforward: ArmFeedforward,
    feedback: F,
    estimator: Option<GravityGainEstimator>,
}

impl JointController<Pid> {
    /// Controller from joint configuration.
    ///
    /// # Errors
    /// [`ConfigError`] when the feedforward gains are invalid.
    pub fn from_config(joint: Joint, config: &JointConfig) -> Result<Self, ConfigError> {
        let mut controller = Self::new(
            joint,
            config.constraints,
            ArmFeedforward::new(config.feedforward)?,
            Pid::new(config.feedback),
        );
        if let Some(auto_tune) = config.auto_tune {
            controller = controller.with_estimator(GravityGainEstimator::new(auto_tune));
        }
        Ok(controller)
    }
}

impl<F: FeedbackController> JointController<F> {
    pub fn new(
        joint: Joint,
        constraints: MotionConstraints,
        feedforward: ArmFeedforward,
        feedback: F,
    ) -> Self {
        Self {
            joint,
            constraints,
            feedforward,
            feedback,
            estimator: None,
        }
    }

    /// Enable online gravity-gain adjustment.
    pub fn with_estimator(mut self, estimator: GravityGainEstimator) -> Self {
        self.estimator = Some(estimator);
        self
    }

    pub fn joint(&self) -> Joint {
        self.joint
    }

    pub fn constraints(&self) -> &MotionConstraints {
        &self.constraints
    }

    pub fn feedforward(&self) -> &ArmFeedforward {
        &self.feedforward
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    /// Profile from rest at `measured` to rest at `goal`.
    ///
    /// # Errors
    /// [`ProfileError`] when either angle is non-finite.
    pub fn plan(&self, measured: f64, goal: f64) -> Result<TrapezoidProfile, ProfileError> {
        let profile = TrapezoidProfile::new(
            self.constraints,
            MotionState::at_rest(goal),
            MotionState::at_rest(measured),
        )?;
        debug!(
            joint = %self.joint,
            from = measured,
            to = goal,
            duration = profile.total_time(),
            "profile planned"
        );
        Ok(profile)
    }

    /// Run one control tick.
    ///
    /// # Arguments
    /// - `state`: Loop state for this joint.
    /// - `measured`: Measured joint angle [rad].
    /// - `dt`: Time since the previous tick [s].
    pub fn tick(&mut self, state: &mut JointLoopState, measured: f64, dt: f64) -> JointTick {
        // ── 1. Setpoint ─────────────────────────────────────────
        let setpoint = state.advance(dt);

        // ── 2. Feedforward (profile acceleration not used) ─────
        let feedforward = self
            .feedforward
            .calculate(setpoint.position, setpoint.velocity, 0.0);

        // ── 3. Feedback ─────────────────────────────────────────
        let feedback = self.feedback.compute(setpoint.position, measured, dt);

        // ── 4. Sum ──────────────────────────────────────────────
        let command = feedforward + feedback;

        // ── 5. Gain estimation (affects the next tick) ─────────
        if let Some(estimator) = self.estimator.as_mut() {
            let delta = estimator.update(measured);
            if delta != 0.0 {
                self.feedforward.apply_gravity_delta(delta);
            }
        }

        trace!(
            joint = %self.joint,
            setpoint = setpoint.position,
            measured,
            command,
            "joint tick"
        );

        JointTick {
            setpoint,
            measured,
            feedforward,
            feedback,
            command,
        }
    }

    /// Clear feedback and estimator history.
    pub fn reset(&mut self) {
        self.feedback.reset();
        if let Some(estimator) = self.estimator.as_mut() {
            estimator.reset();
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use arm_common::arm::control::{AutoTuneConfig, FeedforwardGains, PidParameters};

    const DT: f64 = 1.0 / 60.0;

    /// Records its inputs and returns a fixed value.
    #[derive(Debug, Default)]
    struct Recording {
        calls: Vec<(f64, f64, f64)>,
        resets: usize,
    }

    impl FeedbackController for Recording {
        fn compute(&mut self, setpoint: f64, measured: f64, dt: f64) -> f64 {
            self.calls.push((setpoint, measured, dt));
            0.5
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn controller(gravity: f64) -> JointController<Recording> {
        JointController::new(
            Joint::Shoulder,
            MotionConstraints::new(2.0, 1.0),
            ArmFeedforward::new(FeedforwardGains::new(0.0, gravity, 0.0, 0.0)).unwrap(),
            Recording::default(),
        )
    }

    #[test]
    fn holds_last_setpoint_without_profile() {
        let mut c = controller(0.0);
        let mut state = JointLoopState::holding(0.3);
        let tick = c.tick(&mut state, 0.1, DT);
        assert_eq!(tick.setpoint, MotionState::at_rest(0.3));
        assert_eq!(c.feedback().calls, vec![(0.3, 0.1, DT)]);
        assert_eq!(tick.command, 0.5);
        assert_eq!(state.elapsed(), 0.0);
        assert!(!state.is_finished());
    }

    #[test]
    fn command_is_feedforward_plus_feedback() {
        let mut c = controller(10.0);
        let mut state = JointLoopState::default();
        let tick = c.tick(&mut state, 0.0, DT);
        assert!((tick.feedforward - 10.0).abs() < 1e-12);
        assert_eq!(tick.feedback, 0.5);
        assert!((tick.command - 10.5).abs() < 1e-12);
    }

    #[test]
    fn follows_profile_and_finishes_on_goal() {
        let mut c = controller(0.0);
        let mut state = JointLoopState::default();
        let profile = c.plan(0.0, 1.0).unwrap();
        let total = profile.total_time();
        state.start(profile);

        let first = c.tick(&mut state, 0.0, DT);
        assert_eq!(first.setpoint, MotionState::REST);

        let mut ticks = 1;
        while !state.is_finished() {
            c.tick(&mut state, 0.0, DT);
            ticks += 1;
            assert!(ticks < 10_000);
        }
        assert!(state.elapsed() >= total);
        let held_at = state.elapsed();

        // Once finished the clock stops and the goal is held exactly.
        for _ in 0..5 {
            let tick = c.tick(&mut state, 0.0, DT);
            assert_eq!(tick.setpoint, MotionState::at_rest(1.0));
        }
        assert_eq!(state.elapsed(), held_at);
    }

    #[test]
    fn finished_only_once_goal_is_the_setpoint() {
        let mut c = controller(0.0);
        let mut state = JointLoopState::holding(0.0);
        let profile = c.plan(0.0, 1.5707963267948966).unwrap();
        let goal = profile.goal();
        state.start(profile);

        let mut ticks = 0;
        loop {
            let tick = c.tick(&mut state, 0.0, DT);
            if state.is_finished() {
                assert_eq!(tick.setpoint, goal);
                assert_eq!(state.last_setpoint(), goal);
                break;
            }
            assert_ne!(tick.setpoint, goal);
            ticks += 1;
            assert!(ticks < 10_000);
        }
    }

    #[test]
    fn zero_length_profile_holds_goal() {
        let c = controller(0.0);
        let mut state = JointLoopState::holding(0.1);
        state.start(c.plan(0.4, 0.4).unwrap());
        assert!(state.is_finished());
        assert_eq!(state.last_setpoint(), MotionState::at_rest(0.4));
    }

    #[test]
    fn restart_replaces_profile() {
        let c = controller(0.0);
        let mut state = JointLoopState::default();
        state.start(c.plan(0.0, 1.0).unwrap());
        state.elapsed = 0.7;
        state.start(c.plan(0.2, -1.0).unwrap());
        assert_eq!(state.elapsed(), 0.0);
        assert_eq!(state.profile().unwrap().goal(), MotionState::at_rest(-1.0));
        assert_eq!(state.profile().unwrap().initial(), MotionState::at_rest(0.2));
    }

    #[test]
    fn zero_length_profile_is_finished_immediately() {
        let c = controller(0.0);
        let mut state = JointLoopState::default();
        state.start(c.plan(0.4, 0.4).unwrap());
        assert!(state.is_finished());
    }

    #[test]
    fn plan_rejects_non_finite_angles() {
        let c = controller(0.0);
        assert!(c.plan(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn estimator_adjusts_gravity_gain() {
        let mut c = controller(100.0).with_estimator(GravityGainEstimator::new(AutoTuneConfig::default()));
        let mut state = JointLoopState::holding(-0.5);
        c.tick(&mut state, -0.5, DT);
        c.tick(&mut state, -0.5, DT);
        // Stalled below horizontal: +step_up once.
        assert_eq!(c.feedforward().gains().gravity, 110.0);
    }

    #[test]
    fn reset_forwards_to_feedback() {
        let mut c = controller(0.0);
        c.reset();
        assert_eq!(c.feedback().resets, 1);
    }

    #[test]
    fn from_config_uses_pid() {
        let config = JointConfig {
            constraints: MotionConstraints::new(2.0, 1.0),
            feedforward: FeedforwardGains::default(),
            feedback: PidParameters::pid(3.0, 0.0, 0.0),
            auto_tune: None,
        };
        let mut c = JointController::from_config(Joint::Wrist, &config).unwrap();
        let mut state = JointLoopState::holding(1.0);
        let tick = c.tick(&mut state, 0.5, DT);
        assert!((tick.feedback - 1.5).abs() < 1e-12);
        assert_eq!(c.joint(), Joint::Wrist);
    }
}
