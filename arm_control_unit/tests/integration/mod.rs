//! Shared simulated plant for the integration tests.

mod config_load;
mod retarget;
mod tracking;

use arm_common::arm::config::ArmConfig;
use arm_common::arm::control::{FeedforwardGains, PidParameters};
use arm_common::arm::joint::Joint;
use arm_control_unit::control::joint::JointTick;
use arm_control_unit::cycle::Actuator;

/// Integration step of the simulated plant [s] (200 Hz).
pub const DT: f64 = 0.005;

/// Simulated joint: integrator-based rotary model with gravity load.
///
/// `accel = (command − load·cos(position)) / inertia − damping·velocity`
///
/// Simple 2nd-order model sufficient for control loop convergence tests.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedJoint {
    pub position: f64,
    pub velocity: f64,
    pub inertia: f64,
    pub damping: f64,
    pub gravity_load: f64,
}

impl SimulatedJoint {
    pub fn new(inertia: f64, damping: f64, gravity_load: f64) -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            inertia,
            damping,
            gravity_load,
        }
    }

    /// Apply `command` for one step.
    pub fn step(&mut self, command: f64, dt: f64) {
        let torque = command - self.gravity_load * self.position.cos();
        let accel = torque / self.inertia - self.damping * self.velocity;
        self.velocity += accel * dt;
        self.position += self.velocity * dt;
    }
}

/// Two independent simulated joints behind the [`Actuator`] interface.
#[derive(Debug, Clone)]
pub struct SimulatedArm {
    pub joints: [SimulatedJoint; 2],
    pub dt: f64,
}

impl SimulatedArm {
    /// Shoulder carries a gravity load, the wrist does not.
    pub fn reference() -> Self {
        Self {
            joints: [
                SimulatedJoint::new(1.0, 2.0, 5.0),
                SimulatedJoint::new(1.0, 2.0, 0.0),
            ],
            dt: DT,
        }
    }
}

impl Actuator for SimulatedArm {
    fn measured_position(&self, joint: Joint) -> f64 {
        self.joints[joint.index()].position
    }

    fn apply(&mut self, joint: Joint, tick: &JointTick) {
        self.joints[joint.index()].step(tick.command, self.dt);
    }
}

/// Configuration tuned for [`SimulatedArm::reference`].
///
/// Feedforward matches the plant's gravity and damping; PID closes the gap
/// left by the missing inertia term.
pub fn plant_config() -> ArmConfig {
    let mut config = ArmConfig::default();
    let feedback = PidParameters::pid(100.0, 50.0, 20.0);

    config.shoulder.feedforward = FeedforwardGains::new(0.0, 5.0, 2.0, 0.0);
    config.shoulder.feedback = feedback;
    config.wrist.feedforward = FeedforwardGains::new(0.0, 0.0, 2.0, 0.0);
    config.wrist.feedback = feedback;
    config
}
