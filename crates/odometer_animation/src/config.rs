//! Animator configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of ticks an animation is spread over
pub const DEFAULT_STEPS: i64 = 15;

/// Default delay between ticks (~60Hz)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 17;

/// Timing configuration for a [`StepAnimator`](crate::StepAnimator)
///
/// `steps <= 0` is accepted by the animator and degrades to an immediate
/// snap; [`validate`](Self::validate) reports it for callers that want to
/// reject such input up front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Target number of ticks per animation
    pub steps: i64,
    /// Delay between ticks in milliseconds
    pub tick_interval_ms: u64,
}

impl AnimatorConfig {
    pub fn new(steps: i64, tick_interval: Duration) -> Self {
        Self::default()
            .with_steps(steps)
            .with_tick_interval(tick_interval)
    }

    pub fn with_steps(mut self, steps: i64) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check that this configuration produces an actual animation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps <= 0 {
            return Err(ConfigError::StepsOutOfRange(self.steps));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}
