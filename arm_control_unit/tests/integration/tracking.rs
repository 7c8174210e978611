//! Closed-loop tracking on the simulated arm.

use std::time::Duration;

use arm_common::arm::geometry::Point2D;
use arm_common::arm::joint::Joint;
use arm_control_unit::cycle::{Actuator, CycleRunner, FixedStepClock};
use arm_control_unit::kinematics;
use arm_control_unit::telemetry::{TelemetryHistory, TelemetrySink};

use super::{DT, SimulatedArm, plant_config};

fn runner() -> CycleRunner<SimulatedArm, FixedStepClock> {
    CycleRunner::from_config(&plant_config(), SimulatedArm::reference(), FixedStepClock::new(DT).unwrap())
        .unwrap()
}

#[test]
fn converges_on_reachable_target() {
    let mut r = runner();
    let target = Point2D::new(100.0, 120.0);
    r.mailbox().post(target);

    assert!(r.run_until_settled(Duration::from_secs(20)));
    r.run_for(Duration::from_secs(10));

    let goal = r.controller().target().map(|(t, _)| t).unwrap();
    assert_eq!(goal, target);

    for joint in Joint::ALL {
        let setpoint = r.controller().state(joint).last_setpoint().position;
        let error = (setpoint - r.actuator().measured_position(joint)).abs();
        assert!(error < 1e-3, "{joint}: steady-state error {error:.6} rad");
    }

    let reached = kinematics::forward(&r.actuator().measured(), r.controller().geometry());
    assert!(
        reached.distance_to(&target) < 0.5,
        "end-effector at {reached}, target {target}"
    );
}

#[test]
fn tracking_error_stays_small_during_motion() {
    let mut r = runner();
    r.mailbox().post(Point2D::new(-60.0, 150.0));

    let mut worst = 0.0_f64;
    for _ in 0..2_000 {
        let tick = r.step();
        for joint in Joint::ALL {
            let t = tick.joint(joint);
            worst = worst.max((t.setpoint.position - t.measured).abs());
        }
    }
    assert!(worst < 0.1, "worst tracking error {worst:.4} rad");
}

#[test]
fn integral_removes_gravity_mismatch() {
    let mut config = plant_config();
    // No gravity model: the integral term has to carry the load.
    config.shoulder.feedforward.gravity = 0.0;
    let mut r = CycleRunner::from_config(&config, SimulatedArm::reference(), FixedStepClock::new(DT).unwrap())
        .unwrap();

    r.mailbox().post(Point2D::new(100.0, 120.0));
    assert!(r.run_until_settled(Duration::from_secs(20)));
    r.run_for(Duration::from_secs(15));

    let setpoint = r.controller().state(Joint::Shoulder).last_setpoint().position;
    let error = (setpoint - r.actuator().measured_position(Joint::Shoulder)).abs();
    assert!(error < 1e-3, "steady-state error {error:.6} rad");
}

#[test]
fn telemetry_history_holds_the_last_window() {
    let mut r = runner();
    r.mailbox().post(Point2D::new(100.0, 120.0));

    let mut history = TelemetryHistory::new();
    for _ in 0..1_000 {
        let tick = r.step();
        for sample in &tick.samples() {
            history.record(sample);
        }
    }

    assert_eq!(history.len(Joint::Shoulder), 480);
    assert_eq!(history.len(Joint::Wrist), 480);
    // 480 samples at 200 Hz.
    assert!((history.window(Joint::Wrist) - 479.0 * DT).abs() < 1e-9);
    let latest = history.latest(Joint::Shoulder).unwrap();
    assert!((latest.time - 999.0 * DT).abs() < 1e-9);
}
