//! Arm configuration file tests.
//!
//! Full-document parsing, defaults for omitted sections, enum spellings,
//! unknown-field rejection and numeric validation.

use arm_common::config::{ConfigError, ConfigLoader, LogLevel};
use arm_common::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `content` as `arm.toml` into `dir` and return its path.
fn write_arm_toml(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("arm.toml");
    fs::write(&path, content).unwrap();
    path
}

const FULL: &str = r#"
[shared]
log_level = "debug"
service_name = "arm-cu-07"

[control]
cycle_time_us = 5000
branch = "nearest"
wrist_reference = "absolute"

[geometry]
upper_length = 120.0
lower_length = 80.0

[shoulder.constraints]
max_velocity = 2.0
max_acceleration = 1.0

[shoulder.feedforward]
static_friction = 0.5
gravity = 65000.0
velocity_gain = 1.5
acceleration_gain = 0.25
output_range = { min = -70000.0, max = 70000.0 }

[shoulder.feedback]
kp = 50000.0
ki = 1000.0
kd = 30000.0
tf = 0.01
tt = 0.05
out_max = 100000.0

[shoulder.auto_tune]
step_up = 20.0

[wrist.constraints]
max_velocity = 4.0
max_acceleration = 2.0

[wrist.feedback]
kp = 70000.0
action = "reverse"
"#;

const MINIMAL: &str = r#"
[shoulder.constraints]
max_velocity = 2.0
max_acceleration = 1.0

[wrist.constraints]
max_velocity = 4.0
max_acceleration = 2.0
"#;

// ─── Tests ──────────────────────────────────────────────────────────

/// Test: every section of a full document is parsed.
#[test]
fn full_document_loads() {
    let tmp = TempDir::new().unwrap();
    let path = write_arm_toml(tmp.path(), FULL);

    let cfg = ArmConfig::load(&path).expect("should load");
    cfg.validate().expect("should validate");

    assert_eq!(cfg.shared.log_level, LogLevel::Debug);
    assert_eq!(cfg.shared.service_name, "arm-cu-07");
    assert_eq!(cfg.control.cycle_time_us, 5000);
    assert_eq!(cfg.control.branch, BranchPolicy::Nearest);
    assert_eq!(cfg.control.wrist_reference, WristReference::Absolute);
    assert_eq!(cfg.geometry.max_reach(), 200.0);
    assert_eq!(cfg.geometry.min_reach(), 40.0);

    let ff = cfg.shoulder.feedforward;
    assert_eq!(ff.static_friction, 0.5);
    assert_eq!(ff.output_range, Some(OutputRange::new(-70000.0, 70000.0)));
    assert_eq!(cfg.shoulder.feedback.tf, 0.01);

    let tune = cfg.shoulder.auto_tune.unwrap();
    assert_eq!(tune.step_up, 20.0);
    assert_eq!(tune.step_down, 1.0);
    assert_eq!(tune.resolution, 1e-4);

    assert!(cfg.wrist.is_reverse_acting());
    assert_eq!(cfg.wrist.feedback.ki, 0.0);
    assert!(cfg.wrist.auto_tune.is_none());
    assert_eq!(cfg.joint(Joint::Wrist).feedback.kp, 70000.0);
}

/// Test: omitted sections take their defaults.
#[test]
fn minimal_document_uses_defaults() {
    let cfg = ArmConfig::from_toml_str(MINIMAL).unwrap();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.shared, SharedConfig::default());
    assert_eq!(cfg.control.cycle_time_us, CYCLE_TIME_US);
    assert_eq!(cfg.control.wrist_reference, WristReference::Relative);
    assert_eq!(cfg.geometry, ArmGeometry::default());
    assert_eq!(cfg.wrist.feedback, PidParameters::default());
}

/// Test: each joint section is required.
#[test]
fn missing_joint_section_is_a_parse_error() {
    let doc = "[shoulder.constraints]\nmax_velocity = 2.0\nmax_acceleration = 1.0\n";
    assert!(matches!(
        ArmConfig::from_toml_str(doc),
        Err(ConfigError::ParseError(_))
    ));
}

/// Test: enum spellings are snake_case only.
#[test]
fn unknown_branch_is_a_parse_error() {
    let doc = format!("{MINIMAL}\n[control]\nbranch = \"ElbowDown\"\n");
    assert!(matches!(
        ArmConfig::from_toml_str(&doc),
        Err(ConfigError::ParseError(_))
    ));
}

/// Test: typos in top-level sections are not silently ignored.
#[test]
fn unknown_top_level_section_is_rejected() {
    let doc = format!("{MINIMAL}\n[geometri]\nupper_length = 1.0\n");
    assert!(ArmConfig::from_toml_str(&doc).is_err());
}

/// Test: numeric validation after a successful parse.
#[test]
fn validation_failures() {
    let cases = [
        ("[geometry]\nupper_length = 0.0\nlower_length = 40.0\n", "upper_length"),
        ("[control]\ncycle_time_us = 500\n", "cycle_time_us"),
        ("[shared]\nservice_name = \"\"\n", "service_name"),
    ];
    for (extra, needle) in cases {
        let doc = format!("{MINIMAL}\n{extra}");
        let cfg = ArmConfig::from_toml_str(&doc).unwrap();
        match cfg.validate() {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains(needle), "{needle}: {msg}")
            }
            other => panic!("{needle}: expected validation error, got {other:?}"),
        }
    }
}

/// Test: joint-scoped errors carry the joint name.
#[test]
fn joint_validation_is_scoped() {
    let mut cfg = ArmConfig::from_toml_str(FULL).unwrap();
    cfg.shoulder.feedforward.output_range = Some(OutputRange::new(1.0, -1.0));
    match cfg.validate() {
        Err(ConfigError::ValidationError(msg)) => {
            assert!(msg.starts_with("shoulder:"), "{msg}");
            assert!(msg.contains("output_range"), "{msg}");
        }
        other => panic!("unexpected: {other:?}"),
    }

    let mut cfg = ArmConfig::from_toml_str(FULL).unwrap();
    cfg.wrist.feedback.kd = -1.0;
    match cfg.validate() {
        Err(ConfigError::ValidationError(msg)) => assert!(msg.starts_with("wrist:"), "{msg}"),
        other => panic!("unexpected: {other:?}"),
    }
}
