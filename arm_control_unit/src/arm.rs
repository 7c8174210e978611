//! Arm-level controller.
//!
//! Turns end-effector targets into per-joint profiles and runs both joint
//! loops each tick. Retargeting is all-or-nothing: both joint profiles are
//! planned before either loop state changes, so a rejected target leaves the
//! current motion untouched.

use arm_common::arm::config::ArmConfig;
use arm_common::arm::geometry::{ArmGeometry, BranchPolicy, ElbowBranch, Point2D, WristReference};
use arm_common::arm::joint::{Joint, JointAngles};
use tracing::{debug, warn};

use crate::control::joint::{JointController, JointLoopState, JointTick};
use crate::error::ArmError;
use crate::kinematics;
use crate::telemetry::TelemetrySample;

/// Output of one arm tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmTick {
    /// Controller time at the start of this tick [s].
    pub time: f64,
    pub shoulder: JointTick,
    pub wrist: JointTick,
}

impl ArmTick {
    pub fn joint(&self, joint: Joint) -> &JointTick {
        match joint {
            Joint::Shoulder => &self.shoulder,
            Joint::Wrist => &self.wrist,
        }
    }

    /// One telemetry sample per joint, in tick order.
    pub fn samples(&self) -> [TelemetrySample; 2] {
        Joint::ALL.map(|joint| TelemetrySample::from_tick(self.time, joint, self.joint(joint)))
    }
}

/// Two-joint arm controller.
#[derive(Debug, Clone)]
pub struct ArmController {
    geometry: ArmGeometry,
    branch_policy: BranchPolicy,
    wrist_reference: WristReference,
    shoulder: JointController,
    wrist: JointController,
    states: [JointLoopState; 2],
    /// Last accepted target and the branch chosen for it.
    target: Option<(Point2D, ElbowBranch)>,
    time: f64,
    tick_count: u64,
}

impl ArmController {
    /// Build from a configuration.
    ///
    /// # Errors
    /// [`ArmError::Config`] when the configuration fails validation.
    pub fn new(config: &ArmConfig) -> Result<Self, ArmError> {
        config.validate()?;
        Ok(Self {
            geometry: config.geometry,
            branch_policy: config.control.branch,
            wrist_reference: config.control.wrist_reference,
            shoulder: JointController::from_config(Joint::Shoulder, &config.shoulder)?,
            wrist: JointController::from_config(Joint::Wrist, &config.wrist)?,
            states: [JointLoopState::default(); 2],
            target: None,
            time: 0.0,
            tick_count: 0,
        })
    }

    pub fn geometry(&self) -> &ArmGeometry {
        &self.geometry
    }

    pub fn branch_policy(&self) -> BranchPolicy {
        self.branch_policy
    }

    pub fn wrist_reference(&self) -> WristReference {
        self.wrist_reference
    }

    pub fn controller(&self, joint: Joint) -> &JointController {
        match joint {
            Joint::Shoulder => &self.shoulder,
            Joint::Wrist => &self.wrist,
        }
    }

    pub fn state(&self, joint: Joint) -> &JointLoopState {
        &self.states[joint.index()]
    }

    /// Last accepted target and its branch.
    pub fn target(&self) -> Option<(Point2D, ElbowBranch)> {
        self.target
    }

    /// Controller time [s].
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Drop any profiles and hold `angles` (actuator frame).
    pub fn hold(&mut self, angles: JointAngles) {
        for joint in Joint::ALL {
            self.states[joint.index()].hold(angles.get(joint));
        }
        self.target = None;
    }

    /// Joint angles for `target` in the actuator frame, using the configured
    /// branch policy. `measured` (actuator frame) is only consulted by
    /// [`BranchPolicy::Nearest`].
    pub fn solve(
        &self,
        target: Point2D,
        measured: &JointAngles,
    ) -> Result<(ElbowBranch, JointAngles), ArmError> {
        let solutions = kinematics::solve(target, &self.geometry)?;
        let current = self.to_relative(measured);
        let (branch, angles) = solutions.select(self.branch_policy, &current);
        Ok((branch, self.to_actuator(&angles)))
    }

    /// Command a new end-effector target.
    ///
    /// Solves the inverse kinematics and replaces both joint profiles with
    /// fresh ones starting at rest from `measured`. In-flight profiles are
    /// discarded, so the setpoint velocity may jump.
    ///
    /// # Errors
    /// [`ArmError::Kinematics`] for unreachable or degenerate targets,
    /// [`ArmError::Profile`] for non-finite measurements. Nothing changes on
    /// error.
    pub fn command_target(
        &mut self,
        target: Point2D,
        measured: &JointAngles,
    ) -> Result<JointAngles, ArmError> {
        let planned = self.solve(target, measured).and_then(|(branch, goal)| {
            let shoulder = self.shoulder.plan(measured.shoulder, goal.shoulder)?;
            let wrist = self.wrist.plan(measured.wrist, goal.wrist)?;
            Ok((branch, goal, shoulder, wrist))
        });
        let (branch, goal, shoulder, wrist) = planned.inspect_err(|e| {
            warn!(%target, error = %e, "target rejected");
        })?;

        self.states[Joint::Shoulder.index()].start(shoulder);
        self.states[Joint::Wrist.index()].start(wrist);
        self.target = Some((target, branch));

        debug!(
            %target,
            ?branch,
            shoulder = goal.shoulder,
            wrist = goal.wrist,
            duration = shoulder.total_time().max(wrist.total_time()),
            "retargeted"
        );
        Ok(goal)
    }

    /// Run one tick for both joints.
    ///
    /// # Arguments
    /// - `measured`: Joint angles in the actuator frame [rad].
    /// - `dt`: Time since the previous tick [s].
    pub fn tick(&mut self, measured: &JointAngles, dt: f64) -> ArmTick {
        let [shoulder_state, wrist_state] = &mut self.states;
        let shoulder = self.shoulder.tick(shoulder_state, measured.shoulder, dt);
        let wrist = self.wrist.tick(wrist_state, measured.wrist, dt);

        let tick = ArmTick {
            time: self.time,
            shoulder,
            wrist,
        };
        self.time += dt.max(0.0);
        self.tick_count += 1;
        tick
    }

    /// Both joints have finished their profiles.
    pub fn is_settled(&self) -> bool {
        self.states.iter().all(JointLoopState::is_finished)
    }

    /// Relative-frame angles → actuator frame.
    fn to_actuator(&self, angles: &JointAngles) -> JointAngles {
        match self.wrist_reference {
            WristReference::Relative => *angles,
            WristReference::Absolute => {
                JointAngles::new(angles.shoulder, angles.shoulder + angles.wrist)
            }
        }
    }

    /// Actuator-frame angles → relative frame.
    fn to_relative(&self, angles: &JointAngles) -> JointAngles {
        match self.wrist_reference {
            WristReference::Relative => *angles,
            WristReference::Absolute => {
                JointAngles::new(angles.shoulder, angles.wrist - angles.shoulder)
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
