//! Online gravity-gain estimation.
//!
//! Best-effort heuristic: while the joint does not move between ticks the
//! gravity term is presumed too weak and is raised; while the joint sits
//! above horizontal it is presumed too strong and is lowered. Not required
//! for correct control and disabled unless configured.

use arm_common::arm::control::AutoTuneConfig;

/// Estimator producing a gain correction from one observed position per tick.
pub trait GainEstimator {
    /// Feed the latest observed position and return the gain delta to apply.
    fn update(&mut self, observed_position: f64) -> f64;

    /// Forget the observation history.
    fn reset(&mut self);
}

/// Step-based gravity-gain tuner.
#[derive(Debug, Clone, PartialEq)]
pub struct GravityGainEstimator {
    config: AutoTuneConfig,
    previous_position: Option<f64>,
}

impl GravityGainEstimator {
    pub fn new(config: AutoTuneConfig) -> Self {
        Self {
            config,
            previous_position: None,
        }
    }

    /// Round `value` to the configured resolution.
    #[inline]
    fn quantize(&self, value: f64) -> f64 {
        (value / self.config.resolution).round() * self.config.resolution
    }
}

impl GainEstimator for GravityGainEstimator {
    fn update(&mut self, observed_position: f64) -> f64 {
        let mut delta = 0.0;

        if let Some(previous) = self.previous_position {
            if self.quantize(observed_position - previous) == 0.0 {
                delta += self.config.step_up;
            }
            if observed_position > 0.0 {
                delta -= self.config.step_down;
            }
        }

        self.previous_position = Some(observed_position);
        delta
    }

    fn reset(&mut self) {
        self.previous_position = None;
    }
}
