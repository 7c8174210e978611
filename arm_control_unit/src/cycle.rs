//! Cooperative control cycle: read → process → write.
//!
//! Each [`CycleRunner::step`]:
//! 1. Takes the elapsed time from the [`Clock`].
//! 2. Reads measured joint angles from the [`Actuator`].
//! 3. Applies a pending target from the [`TargetMailbox`], if any.
//! 4. Ticks the [`ArmController`].
//! 5. Writes both joint commands to the actuator and forwards telemetry.
//!
//! Nothing in the step returns an error; a rejected target is logged and the
//! current motion continues.

use std::time::{Duration, Instant};

use arm_common::arm::config::ArmConfig;
use arm_common::arm::joint::{Joint, JointAngles};
use arm_common::config::ConfigError;
use tracing::{debug, warn};

use crate::arm::{ArmController, ArmTick};
use crate::command::TargetMailbox;
use crate::control::joint::JointTick;
use crate::error::ArmError;
use crate::telemetry::TelemetrySink;

// ─── External Interfaces ────────────────────────────────────────────

/// Joint hardware (or a simulation of it).
pub trait Actuator {
    /// Current joint angle [rad].
    fn measured_position(&self, joint: Joint) -> f64;

    /// Drive `joint` with `tick.command`.
    fn apply(&mut self, joint: Joint, tick: &JointTick);

    /// Both joint angles.
    fn measured(&self) -> JointAngles {
        JointAngles::new(
            self.measured_position(Joint::Shoulder),
            self.measured_position(Joint::Wrist),
        )
    }
}

/// Time source for the cycle.
pub trait Clock {
    /// Seconds since the previous call (or since creation).
    fn delta_seconds(&mut self) -> f64;

    /// Block until the next cycle boundary. `busy` is how long the step took.
    fn pace(&mut self, _period: Duration, _busy: Duration) {}
}

/// Wall-clock time; sleeps out the rest of each cycle.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    last: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn delta_seconds(&mut self) -> f64 {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        dt.as_secs_f64()
    }

    fn pace(&mut self, period: Duration, busy: Duration) {
        if let Some(remaining) = period.checked_sub(busy) {
            std::thread::sleep(remaining);
        }
    }
}

/// Constant step per call, no sleeping. For simulation and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStepClock {
    step: f64,
}

impl FixedStepClock {
    /// # Errors
    /// [`ConfigError::ValidationError`] unless `step` is finite and `> 0`.
    pub fn new(step: f64) -> Result<Self, ConfigError> {
        if !(step.is_finite() && step > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "clock step must be finite and > 0, got {step}"
            )));
        }
        Ok(Self { step })
    }

    pub fn from_duration(step: Duration) -> Result<Self, ConfigError> {
        Self::new(step.as_secs_f64())
    }
}

impl Clock for FixedStepClock {
    fn delta_seconds(&mut self) -> f64 {
        self.step
    }
}

/// Reports whatever setpoint it was last driven to.
///
/// Stand-in for hardware when only the commanded trajectory matters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopbackActuator {
    positions: [f64; 2],
    commands: [f64; 2],
}

impl LoopbackActuator {
    pub fn new(initial: JointAngles) -> Self {
        Self {
            positions: [initial.shoulder, initial.wrist],
            commands: [0.0; 2],
        }
    }

    /// Last command applied to `joint`.
    pub fn command(&self, joint: Joint) -> f64 {
        self.commands[joint.index()]
    }
}

impl Actuator for LoopbackActuator {
    fn measured_position(&self, joint: Joint) -> f64 {
        self.positions[joint.index()]
    }

    fn apply(&mut self, joint: Joint, tick: &JointTick) {
        self.positions[joint.index()] = tick.setpoint.position;
        self.commands[joint.index()] = tick.command;
    }
}

// ─── Tick Statistics ────────────────────────────────────────────────

/// O(1) per-tick timing statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct TickStats {
    /// Total ticks executed.
    pub tick_count: u64,
    /// Last step duration [ns].
    pub last_tick_ns: u64,
    /// Minimum step duration [ns].
    pub min_tick_ns: u64,
    /// Maximum step duration [ns].
    pub max_tick_ns: u64,
    /// Running sum for average computation.
    pub sum_tick_ns: u64,
    /// Steps that took longer than the cycle period.
    pub overruns: u64,
    /// Targets rejected by the controller.
    pub rejected_targets: u64,
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

impl TickStats {
    /// Create a new zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            tick_count: 0,
            last_tick_ns: 0,
            min_tick_ns: u64::MAX,
            max_tick_ns: 0,
            sum_tick_ns: 0,
            overruns: 0,
            rejected_targets: 0,
        }
    }

    /// Record a step duration. O(1), no allocation.
    #[inline]
    pub fn record(&mut self, duration_ns: u64) {
        self.tick_count += 1;
        self.last_tick_ns = duration_ns;
        self.min_tick_ns = self.min_tick_ns.min(duration_ns);
        self.max_tick_ns = self.max_tick_ns.max(duration_ns);
        self.sum_tick_ns = self.sum_tick_ns.saturating_add(duration_ns);
    }

    /// Average step time [ns] (0 if no ticks).
    #[inline]
    pub fn avg_tick_ns(&self) -> u64 {
        if self.tick_count == 0 {
            0
        } else {
            self.sum_tick_ns / self.tick_count
        }
    }
}

// ─── Cycle Runner ───────────────────────────────────────────────────

/// Consecutive ticks without controller-time progress before a run gives up.
const MAX_STALLED_TICKS: u32 = 1000;

/// Drives an [`ArmController`] against an actuator.
pub struct CycleRunner<A: Actuator, C: Clock> {
    controller: ArmController,
    actuator: A,
    clock: C,
    mailbox: TargetMailbox,
    sink: Option<Box<dyn TelemetrySink + Send>>,
    stats: TickStats,
    cycle_time: Duration,
}

impl<A: Actuator, C: Clock> CycleRunner<A, C> {
    /// Wrap `controller`; the arm starts holding the actuator's current pose.
    pub fn new(mut controller: ArmController, actuator: A, clock: C, cycle_time: Duration) -> Self {
        controller.hold(actuator.measured());
        Self {
            controller,
            actuator,
            clock,
            mailbox: TargetMailbox::new(),
            sink: None,
            stats: TickStats::new(),
            cycle_time,
        }
    }

    /// Build the controller from `config` and wrap it.
    ///
    /// # Errors
    /// [`ArmError::Config`] when the configuration is invalid.
    pub fn from_config(config: &ArmConfig, actuator: A, clock: C) -> Result<Self, ArmError> {
        let controller = ArmController::new(config)?;
        let cycle_time = Duration::from_micros(u64::from(config.control.cycle_time_us));
        Ok(Self::new(controller, actuator, clock, cycle_time))
    }

    /// Forward every telemetry sample to `sink`.
    pub fn with_sink(mut self, sink: Box<dyn TelemetrySink + Send>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Handle for posting targets, possibly from another thread.
    pub fn mailbox(&self) -> TargetMailbox {
        self.mailbox.clone()
    }

    pub fn controller(&self) -> &ArmController {
        &self.controller
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub fn cycle_time(&self) -> Duration {
        self.cycle_time
    }

    /// Execute one cycle.
    pub fn step(&mut self) -> ArmTick {
        let dt = self.clock.delta_seconds();
        let started = Instant::now();

        // ═══ READ ═══
        let measured = self.actuator.measured();

        // ═══ PROCESS ═══
        if let Some(target) = self.mailbox.take() {
            // Rejections are logged by the controller.
            if self.controller.command_target(target, &measured).is_err() {
                self.stats.rejected_targets += 1;
            }
        }
        let tick = self.controller.tick(&measured, dt);

        // ═══ WRITE ═══
        for joint in Joint::ALL {
            self.actuator.apply(joint, tick.joint(joint));
        }
        if let Some(sink) = self.sink.as_mut() {
            for sample in &tick.samples() {
                sink.record(sample);
            }
        }

        let busy = started.elapsed();
        self.stats.record(u64::try_from(busy.as_nanos()).unwrap_or(u64::MAX));
        if busy > self.cycle_time {
            self.stats.overruns += 1;
            warn!(
                busy_us = busy.as_micros() as u64,
                budget_us = self.cycle_time.as_micros() as u64,
                "cycle overrun"
            );
        }
        self.clock.pace(self.cycle_time, busy);
        tick
    }

    /// Step until `duration` of controller time has passed.
    ///
    /// # Returns
    /// Number of ticks executed.
    pub fn run_for(&mut self, duration: Duration) -> u64 {
        let end = self.controller.time() + duration.as_secs_f64();
        let start_ticks = self.stats.tick_count;
        let mut stalled = 0;
        while self.controller.time() < end && stalled < MAX_STALLED_TICKS {
            stalled = self.step_tracking_stall(stalled);
        }
        let ticks = self.stats.tick_count - start_ticks;
        debug!(ticks, time = self.controller.time(), "run finished");
        ticks
    }

    /// Step until both joints settle or `timeout` of controller time passes.
    ///
    /// # Returns
    /// Whether the arm settled.
    pub fn run_until_settled(&mut self, timeout: Duration) -> bool {
        let end = self.controller.time() + timeout.as_secs_f64();
        let mut stalled = 0;
        while self.controller.time() < end && stalled < MAX_STALLED_TICKS {
            // A target still waiting in the mailbox has not been planned yet.
            if self.controller.is_settled() && !self.mailbox.is_pending() {
                return true;
            }
            stalled = self.step_tracking_stall(stalled);
        }
        self.controller.is_settled() && !self.mailbox.is_pending()
    }

    /// Step once; returns the updated count of consecutive ticks that did
    /// not advance controller time.
    fn step_tracking_stall(&mut self, stalled: u32) -> u32 {
        let before = self.controller.time();
        self.step();
        if self.controller.time() > before {
            return 0;
        }
        let stalled = stalled + 1;
        if stalled == MAX_STALLED_TICKS {
            warn!(ticks = stalled, "controller time not advancing, stopping run");
        }
        stalled
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
