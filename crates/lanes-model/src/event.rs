use serde::{Deserialize, Serialize};

/// Which runner produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunMode {
    /// One task at a time, in input order.
    Sequential,
    /// Every task at once, fail on the first failure.
    All,
    /// At most `max_concurrency` tasks in flight.
    Bounded,
}

impl RunMode {
    /// Short identifier for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Sequential => "sequential",
            RunMode::All => "all",
            RunMode::Bounded => "bounded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// A run accepted its task list.
    RunStarted,
    /// A lane took ownership of a task index and is about to invoke it.
    TaskClaimed,
    /// A task settled with a value.
    TaskSucceeded,
    /// A task settled with a failure.
    TaskFailed,
    /// A lane found no more work and stopped.
    WorkerExited,
    /// Every lane has stopped and the results are assembled.
    RunFinished,
    /// A cancellation token stopped the run before all indices were claimed.
    RunCancelled,
}

/// Notification published by runners to subscribers.
///
/// Only `kind`, `run` and `mode` are always present; the rest depends on the kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunEvent {
    pub kind: EventKind,
    /// Run identifier, unique per runner instance.
    pub run: u64,
    pub mode: RunMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Number of tasks in the run (start/finish events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    /// Number of failed tasks (finish events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
}

impl RunEvent {
    pub fn new(kind: EventKind, run: u64, mode: RunMode) -> Self {
        Self {
            kind,
            run,
            mode,
            index: None,
            worker: None,
            task: None,
            reason: None,
            total: None,
            failed: None,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = Some(task.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_failed(mut self, failed: usize) -> Self {
        self.failed = Some(failed);
        self
    }
}
