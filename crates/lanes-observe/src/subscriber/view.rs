use std::borrow::Borrow;

use lanes_model::{EventKind, RunEvent};
use tracing::{debug, info, trace, warn};

/// Field accessors with log-friendly fallbacks for optional event data.
pub trait View {
    fn kind(&self) -> EventKind;
    fn run(&self) -> u64;
    fn mode(&self) -> &'static str;
    fn as_task(&self) -> &str;
    fn as_reason(&self) -> &str;
    fn index(&self) -> usize;
    fn worker(&self) -> usize;
    fn total(&self) -> usize;
    fn failed(&self) -> usize;
}

impl<T> View for T
where
    T: Borrow<RunEvent>,
{
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
    #[inline]
    fn run(&self) -> u64 {
        self.borrow().run
    }
    #[inline]
    fn mode(&self) -> &'static str {
        self.borrow().mode.as_str()
    }
    #[inline]
    fn as_task(&self) -> &str {
        self.borrow().task.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn as_reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn index(&self) -> usize {
        self.borrow().index.unwrap_or(0)
    }
    #[inline]
    fn worker(&self) -> usize {
        self.borrow().worker.unwrap_or(0)
    }
    #[inline]
    fn total(&self) -> usize {
        self.borrow().total.unwrap_or(0)
    }
    #[inline]
    fn failed(&self) -> usize {
        self.borrow().failed.unwrap_or(0)
    }
}

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        EventKind::RunStarted => "run started",
        EventKind::TaskClaimed => "task claimed by lane",
        EventKind::TaskSucceeded => "task settled with a value",
        EventKind::TaskFailed => "task settled with a failure",
        EventKind::WorkerExited => "lane found no more work",
        EventKind::RunFinished => "run finished",
        EventKind::RunCancelled => "run cancelled before all tasks were claimed",
    }
}

#[inline]
pub fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());

    match e.kind() {
        EventKind::RunStarted => {
            debug!(run = e.run(), mode = e.mode(), total = e.total(), "{msg}")
        }
        EventKind::TaskClaimed => trace!(
            run = e.run(),
            index = e.index(),
            worker = e.worker(),
            task = e.as_task(),
            "{msg}"
        ),
        EventKind::TaskSucceeded => {
            trace!(run = e.run(), index = e.index(), task = e.as_task(), "{msg}")
        }
        EventKind::TaskFailed => warn!(
            run = e.run(),
            mode = e.mode(),
            index = e.index(),
            task = e.as_task(),
            reason = e.as_reason(),
            "{msg}"
        ),
        EventKind::WorkerExited => trace!(run = e.run(), worker = e.worker(), "{msg}"),
        EventKind::RunFinished => info!(
            run = e.run(),
            mode = e.mode(),
            total = e.total(),
            failed = e.failed(),
            "{msg}"
        ),
        EventKind::RunCancelled => {
            warn!(run = e.run(), mode = e.mode(), total = e.total(), "{msg}")
        }
    }
}
