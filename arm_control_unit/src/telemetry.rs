//! Per-tick telemetry.
//!
//! Each tick yields one [`TelemetrySample`] per joint. Sinks decide what to
//! do with them: [`TelemetryHistory`] keeps a fixed-size rolling window for
//! plotting, [`JsonLinesSink`] streams them out as newline-delimited JSON.

use std::io::Write;

use arm_common::arm::joint::Joint;
use arm_common::consts::TELEMETRY_HISTORY_LEN;
use heapless::HistoryBuffer;
use serde::Serialize;
use tracing::warn;

use crate::control::joint::JointTick;

/// One joint's state at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetrySample {
    /// Controller time [s] since start.
    pub time: f64,
    pub joint: Joint,
    /// Setpoint position [rad].
    pub setpoint: f64,
    /// Measured position [rad].
    pub measured: f64,
    /// Setpoint velocity [rad/s].
    pub velocity: f64,
    /// Actuator command.
    pub command: f64,
}

impl TelemetrySample {
    pub fn from_tick(time: f64, joint: Joint, tick: &JointTick) -> Self {
        Self {
            time,
            joint,
            setpoint: tick.setpoint.position,
            measured: tick.measured,
            velocity: tick.setpoint.velocity,
            command: tick.command,
        }
    }

    /// `setpoint − measured`.
    #[inline]
    pub fn tracking_error(&self) -> f64 {
        self.setpoint - self.measured
    }
}

/// Consumer of telemetry samples.
pub trait TelemetrySink {
    fn record(&mut self, sample: &TelemetrySample);
}

// ─── Rolling History ────────────────────────────────────────────────

/// Last [`TELEMETRY_HISTORY_LEN`] samples per joint (8 s at 60 Hz).
///
/// Fixed capacity; the oldest sample is overwritten once full.
#[derive(Debug)]
pub struct TelemetryHistory {
    joints: [HistoryBuffer<TelemetrySample, TELEMETRY_HISTORY_LEN>; 2],
}

impl Default for TelemetryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryHistory {
    pub const fn new() -> Self {
        Self {
            joints: [HistoryBuffer::new(), HistoryBuffer::new()],
        }
    }

    /// Number of retained samples for `joint`.
    pub fn len(&self, joint: Joint) -> usize {
        self.joints[joint.index()].len()
    }

    pub fn is_empty(&self, joint: Joint) -> bool {
        self.len(joint) == 0
    }

    /// Most recent sample for `joint`.
    pub fn latest(&self, joint: Joint) -> Option<&TelemetrySample> {
        self.joints[joint.index()].recent()
    }

    /// Retained samples for `joint`, oldest first.
    pub fn samples(&self, joint: Joint) -> impl Iterator<Item = &TelemetrySample> + '_ {
        self.joints[joint.index()].oldest_ordered()
    }

    /// Time span covered by the retained samples of `joint` [s].
    pub fn window(&self, joint: Joint) -> f64 {
        let oldest = self.samples(joint).next().map(|s| s.time);
        match (oldest, self.latest(joint)) {
            (Some(first), Some(last)) => last.time - first,
            _ => 0.0,
        }
    }

    pub fn clear(&mut self) {
        for buffer in &mut self.joints {
            buffer.clear();
        }
    }
}

impl TelemetrySink for TelemetryHistory {
    fn record(&mut self, sample: &TelemetrySample) {
        self.joints[sample.joint.index()].write(*sample);
    }
}

// ─── JSON Lines ─────────────────────────────────────────────────────

/// Writes each sample as one JSON object per line.
///
/// Write failures are logged once and counted; the control loop never
/// stops because a telemetry consumer went away.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    dropped: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, dropped: 0 }
    }

    /// Samples that could not be written.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_sample(&mut self, sample: &TelemetrySample) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, sample)?;
        self.writer.write_all(b"\n")
    }
}

impl<W: Write> TelemetrySink for JsonLinesSink<W> {
    fn record(&mut self, sample: &TelemetrySample) {
        if let Err(e) = self.write_sample(sample) {
            if self.dropped == 0 {
                warn!(error = %e, "telemetry write failed; dropping samples");
            }
            self.dropped += 1;
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
