//! Shipped configuration file.

use std::path::Path;

use arm_common::arm::config::ArmConfig;
use arm_control_unit::config::load_config;
use arm_control_unit::cycle::{CycleRunner, FixedStepClock, LoopbackActuator};

fn shipped() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config/arm.toml")
}

#[test]
fn shipped_config_loads_and_matches_reference_tuning() {
    let loaded = load_config(&shipped()).unwrap();
    let reference = ArmConfig::default();

    assert_eq!(loaded.arm.shared.service_name, "arm-cu-01");
    assert_eq!(loaded.arm.control, reference.control);
    assert_eq!(loaded.arm.geometry, reference.geometry);
    assert_eq!(loaded.arm.shoulder, reference.shoulder);
    assert_eq!(loaded.arm.wrist, reference.wrist);
}

#[test]
fn shipped_config_builds_a_runner() {
    let loaded = load_config(&shipped()).unwrap();
    let runner = CycleRunner::from_config(
        &loaded.arm,
        LoopbackActuator::default(),
        FixedStepClock::new(loaded.arm.control.cycle_time_secs()).unwrap(),
    )
    .unwrap();
    assert_eq!(runner.cycle_time().as_micros(), 16_667);
}
