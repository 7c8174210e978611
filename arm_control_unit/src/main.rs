//! # Arm Control Unit
//!
//! Drives the two-link arm through a sequence of end-effector targets.
//!
//! Targets are given on the command line as `x,y` pairs. Each is posted to
//! the cycle runner's mailbox; the runner steps until both joints settle,
//! optionally holds for a while, then moves on to the next target. The
//! actuator is a loopback that tracks the commanded setpoint exactly, so the
//! run shows the planned trajectory and the commands that would be sent.

use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use arm_common::arm::geometry::Point2D;
use arm_common::config::LogLevel;
use arm_control_unit::config::{LoadedConfig, load_config};
use arm_control_unit::cycle::{
    Actuator, Clock, CycleRunner, FixedStepClock, LoopbackActuator, MonotonicClock,
};
use arm_control_unit::kinematics;
use arm_control_unit::telemetry::JsonLinesSink;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Two-link arm control unit: IK + trapezoidal profiles + feedforward/PID
#[derive(Parser, Debug)]
#[command(name = "arm_control_unit")]
#[command(version)]
#[command(about = "Inverse kinematics, motion profiling and feedforward + PID control for a two-link arm")]
struct Args {
    /// Path to the arm configuration TOML. Built-in defaults when omitted.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// End-effector target as `x,y` (repeatable, visited in order).
    #[arg(short, long = "target", value_name = "X,Y", allow_hyphen_values = true)]
    targets: Vec<Point2D>,

    /// Seconds to keep holding each target after it settles.
    #[arg(long, default_value_t = 0.0)]
    hold: f64,

    /// Give up on a target after this many seconds of controller time.
    #[arg(long, default_value_t = 30.0)]
    timeout: f64,

    /// Pace ticks against the wall clock instead of simulating.
    #[arg(long)]
    realtime: bool,

    /// Stream per-tick telemetry to stdout as JSON lines.
    #[arg(long)]
    telemetry: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let loaded = match &args.config {
        Some(path) => load_config(path),
        None => Ok(LoadedConfig::defaults()),
    };
    let level = match &loaded {
        Ok(cfg) => cfg.arm.shared.log_level,
        Err(_) => LogLevel::Info,
    };
    setup_tracing(&args, level);

    info!("Arm Control Unit v{} starting...", env!("CARGO_PKG_VERSION"));

    let loaded = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("FATAL: config: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&args, &loaded) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Arm Control Unit shutdown complete");
}

fn run(args: &Args, loaded: &LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !(args.hold.is_finite() && args.hold >= 0.0) {
        return Err(format!("--hold must be >= 0, got {}", args.hold).into());
    }
    if !(args.timeout.is_finite() && args.timeout > 0.0) {
        return Err(format!("--timeout must be > 0, got {}", args.timeout).into());
    }

    let control = &loaded.arm.control;
    info!(
        service = %loaded.arm.shared.service_name,
        source = ?loaded.source,
        cycle_time_us = control.cycle_time_us,
        branch = ?control.branch,
        wrist_reference = ?control.wrist_reference,
        "Config OK"
    );

    let actuator = LoopbackActuator::default();
    if args.realtime {
        drive(args, loaded, actuator, MonotonicClock::new())
    } else {
        let step = FixedStepClock::new(control.cycle_time_secs())?;
        drive(args, loaded, actuator, step)
    }
}

fn drive<A: Actuator, C: Clock>(
    args: &Args,
    loaded: &LoadedConfig,
    actuator: A,
    clock: C,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut runner = CycleRunner::from_config(&loaded.arm, actuator, clock)?;
    if args.telemetry {
        runner = runner.with_sink(Box::new(JsonLinesSink::new(io::stdout())));
    }

    let timeout = Duration::from_secs_f64(args.timeout);
    let hold = Duration::from_secs_f64(args.hold);
    let mut rejected = 0usize;

    for target in &args.targets {
        let before = runner.stats().rejected_targets;
        runner.mailbox().post(*target);
        runner.step();
        if runner.stats().rejected_targets > before {
            rejected += 1;
            continue;
        }

        if runner.run_until_settled(timeout) {
            let reached = kinematics::forward(
                &runner.actuator().measured(),
                runner.controller().geometry(),
            );
            info!(
                %target,
                %reached,
                time = runner.controller().time(),
                "target settled"
            );
        } else {
            warn!(%target, timeout = args.timeout, "target did not settle");
        }

        if !hold.is_zero() {
            runner.run_for(hold);
        }
    }

    let stats = runner.stats();
    info!(
        ticks = stats.tick_count,
        avg_tick_ns = stats.avg_tick_ns(),
        max_tick_ns = stats.max_tick_ns,
        overruns = stats.overruns,
        "run complete"
    );

    if rejected > 0 {
        return Err(format!("{rejected} of {} targets rejected", args.targets.len()).into());
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    // Logs go to stderr so stdout stays clean for telemetry.
    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .compact()
            .init();
    }
}
