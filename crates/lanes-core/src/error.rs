use lanes_model::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("max concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    #[error("task {index} panicked: {message}")]
    TaskPanicked { index: usize, message: String },

    #[error("worker lane failed: {0}")]
    WorkerFailed(String),

    #[error("result slot {0} was never written")]
    SlotUnfilled(usize),

    #[error("invalid runner config: {0}")]
    Config(#[from] ConfigError),
}

/// Failure of a concurrent-all run.
#[derive(Debug, Error)]
pub enum JoinAllError<E> {
    #[error("task {index} failed: {error:?}")]
    Task { index: usize, error: E },

    #[error(transparent)]
    Run(#[from] RunError),
}

impl<E> JoinAllError<E> {
    /// The task failure, if that is what ended the run.
    pub fn task_error(&self) -> Option<&E> {
        match self {
            JoinAllError::Task { error, .. } => Some(error),
            JoinAllError::Run(_) => None,
        }
    }

    pub fn into_task_error(self) -> Option<E> {
        match self {
            JoinAllError::Task { error, .. } => Some(error),
            JoinAllError::Run(_) => None,
        }
    }
}
