//! Shared vocabulary for the `lanes` runners.
//!
//! - [`Task`] / [`TaskRef`] / [`TaskFn`]: the unit of work a runner invokes.
//! - [`Settled`]: tagged outcome record produced by the sequential runner.
//! - [`RunEvent`] / [`EventKind`] / [`RunMode`]: what runners publish to subscribers.
//! - [`RunnerConfig`] / [`RetryPolicy`]: declarative configuration.

mod config;
pub use config::{DEFAULT_MAX_CONCURRENCY, RetryPolicy, RunnerConfig};

mod error;
pub use error::ConfigError;

mod event;
pub use event::{EventKind, RunEvent, RunMode};

mod settled;
pub use settled::Settled;

mod task;
pub use task::{Task, TaskFn, TaskRef, from_sync};
