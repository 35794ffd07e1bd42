use std::{fmt::Debug, sync::Arc};

use lanes_model::{EventKind, TaskRef};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{cursor::Cursor, error::RunError, runner::contained, subscribe::Bus};

/// What a lane hands back: outcomes keyed by task index and, if it stopped early, why.
struct LaneReport<T, E> {
    outcomes: Vec<(usize, Result<T, E>)>,
    stopped: Option<RunError>,
}

/// Run tasks on `min(limit, tasks.len())` lanes sharing one [`Cursor`].
///
/// Slot `i` is `None` only when `cancel` fired before index `i` was claimed.
/// The first panicking task aborts every lane and fails the run.
pub(crate) async fn run<T, E>(
    tasks: Vec<TaskRef<T, E>>,
    limit: usize,
    cancel: Option<CancellationToken>,
    bus: Bus,
) -> Result<Vec<Option<Result<T, E>>>, RunError>
where
    T: Send + 'static,
    E: Send + Debug + 'static,
{
    if limit == 0 {
        return Err(RunError::InvalidConcurrency(limit));
    }

    let total = tasks.len();
    let mut slots: Vec<Option<Result<T, E>>> = std::iter::repeat_with(|| None).take(total).collect();
    if total == 0 {
        return Ok(slots);
    }

    let lanes = limit.min(total);
    debug!(target: "lanes.core.bounded", run = bus.run(), total, lanes, "starting bounded run");
    bus.emit(EventKind::RunStarted, |e| e.with_total(total)).await;

    let tasks: Arc<[TaskRef<T, E>]> = tasks.into();
    let cursor = Arc::new(Cursor::new());

    let mut set = JoinSet::new();
    for worker in 0..lanes {
        set.spawn(lane(
            worker,
            Arc::clone(&tasks),
            Arc::clone(&cursor),
            cancel.clone(),
            bus.clone(),
        ));
    }

    while let Some(joined) = set.join_next().await {
        let failure = match joined {
            Ok(report) => {
                for (index, outcome) in report.outcomes {
                    debug_assert!(slots[index].is_none(), "slot {index} written twice");
                    slots[index] = Some(outcome);
                }
                match report.stopped {
                    Some(err) => err,
                    None => continue,
                }
            }
            Err(join) => RunError::WorkerFailed(join.to_string()),
        };

        warn!(target: "lanes.core.bounded", run = bus.run(), error = %failure, "aborting remaining lanes");
        set.abort_all();
        while set.join_next().await.is_some() {}
        let failed = failed_slots(&slots) + 1;
        bus.emit(EventKind::RunFinished, |e| e.with_total(total).with_failed(failed))
            .await;
        return Err(failure);
    }

    let claimed = cursor.claimed();
    if claimed < total {
        debug!(target: "lanes.core.bounded", claimed, total, "run cancelled before all tasks were claimed");
        bus.emit(EventKind::RunCancelled, |e| e.with_total(total)).await;
    }

    let failed = failed_slots(&slots);
    bus.emit(EventKind::RunFinished, |e| e.with_total(total).with_failed(failed))
        .await;

    Ok(slots)
}

fn failed_slots<T, E>(slots: &[Option<Result<T, E>>]) -> usize {
    slots
        .iter()
        .filter(|slot| matches!(slot, Some(Err(_))))
        .count()
}

async fn lane<T, E>(
    worker: usize,
    tasks: Arc<[TaskRef<T, E>]>,
    cursor: Arc<Cursor>,
    cancel: Option<CancellationToken>,
    bus: Bus,
) -> LaneReport<T, E>
where
    T: Send + 'static,
    E: Send + Debug + 'static,
{
    let mut outcomes = Vec::new();

    loop {
        if cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            trace!(target: "lanes.core.bounded", worker, "cancelled; no further claims");
            break;
        }
        let Some(index) = cursor.claim(tasks.len()) else {
            break;
        };
        let task = Arc::clone(&tasks[index]);

        trace!(target: "lanes.core.bounded", worker, index, task = task.name(), "claimed");
        bus.emit(EventKind::TaskClaimed, |e| {
            e.with_index(index).with_worker(worker).with_task(task.name())
        })
        .await;

        let outcome = match contained(index, Arc::clone(&task)).await {
            Ok(outcome) => outcome,
            Err(err) => {
                bus.emit(EventKind::TaskFailed, |e| {
                    e.with_index(index)
                        .with_worker(worker)
                        .with_task(task.name())
                        .with_reason(err.to_string())
                })
                .await;
                return LaneReport {
                    outcomes,
                    stopped: Some(err),
                };
            }
        };
        let failure = outcome.as_ref().err().map(|err| format!("{err:?}"));
        match failure {
            None => {
                bus.emit(EventKind::TaskSucceeded, |e| {
                    e.with_index(index).with_worker(worker).with_task(task.name())
                })
                .await;
            }
            Some(reason) => {
                debug!(target: "lanes.core.bounded", worker, index, task = task.name(), %reason, "task failed; captured in slot");
                bus.emit(EventKind::TaskFailed, |e| {
                    e.with_index(index)
                        .with_worker(worker)
                        .with_task(task.name())
                        .with_reason(reason)
                })
                .await;
            }
        }
        outcomes.push((index, outcome));
    }

    bus.emit(EventKind::WorkerExited, |e| e.with_worker(worker)).await;
    LaneReport {
        outcomes,
        stopped: None,
    }
}
