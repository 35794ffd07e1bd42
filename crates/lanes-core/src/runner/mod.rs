//! Task runners.
//!
//! Three ways to drive a list of [`TaskRef`]s, all preserving input order in their output:
//! - [`run_sequential`]: strictly one task at a time, every outcome kept as a [`Settled`] record;
//! - [`run_all`]: every task at once, the first failure fails the whole call;
//! - [`run_bounded`]: at most `max_concurrency` tasks in flight, failures kept per slot.
//!
//! The free functions publish no events. [`Runner`] wraps the same operations, takes its
//! lane count from a [`RunnerConfig`] and fans [`RunEvent`](lanes_model::RunEvent)s out to
//! its subscribers.
//!
//! Every task runs on its own tokio task. A panicking task fails the whole call with
//! [`RunError::TaskPanicked`]: nothing after it is started and tasks still in flight are
//! aborted. Ordinary task failures never do that.
//!
//! None of the runners time out or cancel tasks on their own; a task that never settles
//! keeps its lane (or the whole call) busy forever. [`run_bounded_until`] is the opt-in
//! way to stop handing out work.
mod all;
mod bounded;
mod sequential;

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use lanes_model::{RunMode, RunnerConfig, Settled, TaskRef};
use tokio::task::JoinError;
use tokio_util::{sync::CancellationToken, task::AbortOnDropHandle};
use tracing::{info, instrument};

use crate::{
    error::{JoinAllError, RunError},
    subscribe::{Bus, Subscribe},
};

/// Run tasks one at a time, in input order.
///
/// Task `i + 1` is invoked only after task `i` settled. Failures never stop the run;
/// only a panicking task does.
#[instrument(level = "debug", skip_all, fields(tasks = tasks.len()))]
pub async fn run_sequential<T, E>(tasks: Vec<TaskRef<T, E>>) -> Result<Vec<Settled<T, E>>, RunError>
where
    T: Send + 'static,
    E: Send + Debug + 'static,
{
    sequential::run(tasks, &Bus::silent(RunMode::Sequential)).await
}

/// Run every task concurrently and return their values in input order.
///
/// Fails with the first failure observed; values of other tasks are discarded.
#[instrument(level = "debug", skip_all, fields(tasks = tasks.len()))]
pub async fn run_all<T, E>(tasks: Vec<TaskRef<T, E>>) -> Result<Vec<T>, JoinAllError<E>>
where
    T: Send + 'static,
    E: Send + Debug + 'static,
{
    all::run(tasks, Bus::silent(RunMode::All)).await
}

/// Run tasks with at most `max_concurrency` in flight.
///
/// Returns one slot per task, in input order, holding either its value or its failure.
/// Task failures never fail the call; only `max_concurrency == 0` or a panicking task do.
#[instrument(level = "debug", skip_all, fields(tasks = tasks.len(), limit = max_concurrency))]
pub async fn run_bounded<T, E>(
    tasks: Vec<TaskRef<T, E>>,
    max_concurrency: usize,
) -> Result<Vec<Result<T, E>>, RunError>
where
    T: Send + 'static,
    E: Send + Debug + 'static,
{
    let slots = bounded::run(tasks, max_concurrency, None, Bus::silent(RunMode::Bounded)).await?;
    fill_slots(slots)
}

/// Like [`run_bounded`], but lanes stop claiming new tasks once `cancel` fires.
///
/// Tasks already running are left to settle. Slots of tasks that were never started are `None`.
#[instrument(level = "debug", skip_all, fields(tasks = tasks.len(), limit = max_concurrency))]
pub async fn run_bounded_until<T, E>(
    tasks: Vec<TaskRef<T, E>>,
    max_concurrency: usize,
    cancel: CancellationToken,
) -> Result<Vec<Option<Result<T, E>>>, RunError>
where
    T: Send + 'static,
    E: Send + Debug + 'static,
{
    bounded::run(
        tasks,
        max_concurrency,
        Some(cancel),
        Bus::silent(RunMode::Bounded),
    )
    .await
}

/// Run one task on its own tokio task so that a panic comes back as [`RunError`].
///
/// Dropping the returned future aborts the task.
async fn contained<T, E>(index: usize, task: TaskRef<T, E>) -> Result<Result<T, E>, RunError>
where
    T: Send + 'static,
    E: Send + 'static,
{
    AbortOnDropHandle::new(tokio::spawn(async move { task.run().await }))
        .await
        .map_err(|join| join_failure(index, join))
}

fn join_failure(index: usize, join: JoinError) -> RunError {
    if !join.is_panic() {
        return RunError::WorkerFailed(join.to_string());
    }
    let payload = join.into_panic();
    let message = match payload.downcast_ref::<&str>() {
        Some(msg) => (*msg).to_string(),
        None => payload
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_else(|| "non-string panic payload".to_string()),
    };
    RunError::TaskPanicked { index, message }
}

fn fill_slots<T, E>(slots: Vec<Option<Result<T, E>>>) -> Result<Vec<Result<T, E>>, RunError> {
    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| slot.ok_or(RunError::SlotUnfilled(index)))
        .collect()
}

/// Configured runner publishing events to its subscribers.
pub struct Runner {
    cfg: RunnerConfig,
    subscribers: Arc<[Arc<dyn Subscribe>]>,
    runs: AtomicU64,
}

impl Runner {
    pub fn new(cfg: RunnerConfig) -> Result<Self, RunError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            subscribers: Arc::from(Vec::new()),
            runs: AtomicU64::new(0),
        })
    }

    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let names: Vec<&'static str> = subscribers.iter().map(|s| s.name()).collect();
        info!(target: "lanes.core.runner", subscribers = ?names, "subscribers attached");
        self.subscribers = subscribers.into();
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.cfg
    }

    /// See [`run_sequential`].
    #[instrument(level = "debug", skip_all, fields(tasks = tasks.len()))]
    pub async fn sequential<T, E>(
        &self,
        tasks: Vec<TaskRef<T, E>>,
    ) -> Result<Vec<Settled<T, E>>, RunError>
    where
        T: Send + 'static,
        E: Send + Debug + 'static,
    {
        sequential::run(tasks, &self.bus(RunMode::Sequential)).await
    }

    /// See [`run_all`].
    #[instrument(level = "debug", skip_all, fields(tasks = tasks.len()))]
    pub async fn all<T, E>(&self, tasks: Vec<TaskRef<T, E>>) -> Result<Vec<T>, JoinAllError<E>>
    where
        T: Send + 'static,
        E: Send + Debug + 'static,
    {
        all::run(tasks, self.bus(RunMode::All)).await
    }

    /// See [`run_bounded`]; the lane count comes from the config.
    #[instrument(level = "debug", skip_all, fields(tasks = tasks.len(), limit = self.cfg.max_concurrency))]
    pub async fn bounded<T, E>(&self, tasks: Vec<TaskRef<T, E>>) -> Result<Vec<Result<T, E>>, RunError>
    where
        T: Send + 'static,
        E: Send + Debug + 'static,
    {
        let bus = self.bus(RunMode::Bounded);
        let slots = bounded::run(tasks, self.cfg.max_concurrency, None, bus).await?;
        fill_slots(slots)
    }

    /// See [`run_bounded_until`]; the lane count comes from the config.
    #[instrument(level = "debug", skip_all, fields(tasks = tasks.len(), limit = self.cfg.max_concurrency))]
    pub async fn bounded_until<T, E>(
        &self,
        tasks: Vec<TaskRef<T, E>>,
        cancel: CancellationToken,
    ) -> Result<Vec<Option<Result<T, E>>>, RunError>
    where
        T: Send + 'static,
        E: Send + Debug + 'static,
    {
        let bus = self.bus(RunMode::Bounded);
        bounded::run(tasks, self.cfg.max_concurrency, Some(cancel), bus).await
    }

    fn bus(&self, mode: RunMode) -> Bus {
        let run = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        Bus::new(Arc::clone(&self.subscribers), run, mode)
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            cfg: RunnerConfig::default(),
            subscribers: Arc::from(Vec::new()),
            runs: AtomicU64::new(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanes_model::TaskFn;

    #[test]
    fn rejects_invalid_config() {
        assert!(matches!(
            Runner::new(RunnerConfig::new(0)),
            Err(RunError::Config(_))
        ));
    }

    #[test]
    fn run_ids_increase_per_run() {
        let runner = Runner::default();
        assert_eq!(runner.bus(RunMode::All).run(), 1);
        assert_eq!(runner.bus(RunMode::Bounded).run(), 2);
    }

    #[test]
    fn fill_slots_reports_first_gap() {
        let slots: Vec<Option<Result<i32, ()>>> = vec![Some(Ok(1)), None, None];
        assert!(matches!(fill_slots(slots), Err(RunError::SlotUnfilled(1))));
    }

    async fn lane_down() -> Result<(), ()> {
        panic!("lane down")
    }

    async fn slot_broke() -> Result<(), ()> {
        panic!("slot {} broke", 7)
    }

    #[tokio::test]
    async fn contained_reports_panic_with_index() {
        let task: TaskRef<(), ()> = TaskFn::arc("panics", lane_down);
        match contained(4, task).await {
            Err(RunError::TaskPanicked { index, message }) => {
                assert_eq!(index, 4);
                assert_eq!(message, "lane down");
            }
            other => panic!("expected a panic report, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn contained_reports_formatted_panic_payload() {
        let task: TaskRef<(), ()> = TaskFn::arc("panics", slot_broke);
        assert!(matches!(
            contained(0, task).await,
            Err(RunError::TaskPanicked { message, .. }) if message == "slot 7 broke"
        ));
    }

    #[tokio::test]
    async fn runner_uses_configured_limit() {
        let runner = Runner::new(RunnerConfig::new(2)).unwrap();
        let tasks: Vec<TaskRef<usize, String>> = (0..5)
            .map(|i| TaskFn::arc(format!("t{i}"), move || async move { Ok(i * 10) }))
            .collect();

        let out = runner.bounded(tasks).await.unwrap();
        assert_eq!(out, vec![Ok(0), Ok(10), Ok(20), Ok(30), Ok(40)]);
    }
}
