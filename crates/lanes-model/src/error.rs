use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("retry policy needs at least one attempt")]
    ZeroAttempts,
    #[error("backoff factor must be a finite number >= 1.0, got {0}")]
    InvalidFactor(f64),
    #[error("first delay ({first_ms}ms) exceeds max delay ({max_ms}ms)")]
    InvalidDelay { first_ms: u64, max_ms: u64 },
}
