use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Lane count used when none is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_FIRST_MS: u64 = 1_000;
const DEFAULT_MAX_MS: u64 = 30_000;
const DEFAULT_FACTOR: f64 = 2.0;

/// Runner-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RunnerConfig {
    /// Upper bound on tasks in flight for bounded runs.
    pub max_concurrency: usize,
}

impl RunnerConfig {
    pub fn new(max_concurrency: usize) -> Self {
        Self { max_concurrency }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// Exponential backoff between attempts of a retried task.
///
/// The delay before retry `n` (0-based) is `first_ms * factor^n`, capped at `max_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub first_ms: u64,
    /// Upper bound on any single delay, in milliseconds.
    pub max_ms: u64,
    /// Multiplier applied after every retry.
    pub factor: f64,
}

impl RetryPolicy {
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts,
            ..Self::default()
        }
    }

    pub fn with_first_ms(mut self, first_ms: u64) -> Self {
        self.first_ms = first_ms;
        self
    }

    pub fn with_max_ms(mut self, max_ms: u64) -> Self {
        self.max_ms = max_ms;
        self
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(ConfigError::InvalidFactor(self.factor));
        }
        if self.first_ms > self.max_ms {
            return Err(ConfigError::InvalidDelay {
                first_ms: self.first_ms,
                max_ms: self.max_ms,
            });
        }
        Ok(())
    }

    /// Delay to wait before retry number `retry` (0 = first retry).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let scaled = self.first_ms as f64 * self.factor.powi(retry.min(i32::MAX as u32) as i32);
        let ms = if scaled.is_finite() {
            scaled.min(self.max_ms as f64) as u64
        } else {
            self.max_ms
        };
        Duration::from_millis(ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            first_ms: DEFAULT_FIRST_MS,
            max_ms: DEFAULT_MAX_MS,
            factor: DEFAULT_FACTOR,
        }
    }
}
