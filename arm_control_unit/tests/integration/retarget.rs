//! Retargeting behavior of the arm controller.

use std::time::Duration;

use arm_common::arm::geometry::Point2D;
use arm_common::arm::joint::Joint;
use arm_common::arm::motion::MotionState;
use arm_control_unit::cycle::{Actuator, CycleRunner, FixedStepClock};

use super::{DT, SimulatedArm, plant_config};

fn runner() -> CycleRunner<SimulatedArm, FixedStepClock> {
    CycleRunner::from_config(&plant_config(), SimulatedArm::reference(), FixedStepClock::new(DT).unwrap())
        .unwrap()
}

#[test]
fn unreachable_target_leaves_active_profile_untouched() {
    let mut r = runner();
    let first = Point2D::new(100.0, 120.0);
    r.mailbox().post(first);
    r.run_for(Duration::from_millis(500));

    let shoulder_before = *r.controller().state(Joint::Shoulder).profile().unwrap();
    let wrist_before = *r.controller().state(Joint::Wrist).profile().unwrap();
    let elapsed_before = r.controller().state(Joint::Shoulder).elapsed();

    r.mailbox().post(Point2D::new(300.0, 0.0));
    r.step();

    assert_eq!(r.stats().rejected_targets, 1);
    assert_eq!(r.controller().target().unwrap().0, first);
    assert_eq!(
        *r.controller().state(Joint::Shoulder).profile().unwrap(),
        shoulder_before
    );
    assert_eq!(*r.controller().state(Joint::Wrist).profile().unwrap(), wrist_before);
    // The old profile kept running through the rejected step.
    assert!(r.controller().state(Joint::Shoulder).elapsed() > elapsed_before);

    assert!(r.run_until_settled(Duration::from_secs(20)));
}

#[test]
fn new_target_restarts_from_measured_position() {
    let mut r = runner();
    r.mailbox().post(Point2D::new(100.0, 120.0));
    r.run_for(Duration::from_secs(1));

    let measured = r.actuator().measured();
    let second = Point2D::new(170.0, -40.0);
    r.mailbox().post(second);
    r.step();

    for joint in Joint::ALL {
        let state = r.controller().state(joint);
        let profile = state.profile().unwrap();
        assert_eq!(profile.initial(), MotionState::at_rest(measured.get(joint)));
        assert!((state.elapsed() - DT).abs() < 1e-12);
    }
    assert_eq!(r.controller().target().unwrap().0, second);

    assert!(r.run_until_settled(Duration::from_secs(20)));
    r.run_for(Duration::from_secs(10));
    let reached = arm_control_unit::kinematics::forward(
        &r.actuator().measured(),
        r.controller().geometry(),
    );
    assert!(reached.distance_to(&second) < 0.5, "reached {reached}");
}

#[test]
fn latest_posted_target_wins() {
    let mut r = runner();
    let mailbox = r.mailbox();
    mailbox.post(Point2D::new(100.0, 120.0));
    mailbox.post(Point2D::new(0.0, 185.0));
    r.step();
    assert_eq!(r.controller().target().unwrap().0, Point2D::new(0.0, 185.0));
}
