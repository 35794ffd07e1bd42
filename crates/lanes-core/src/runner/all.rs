use std::{collections::HashMap, fmt::Debug};

use lanes_model::{EventKind, TaskRef};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::{
    error::{JoinAllError, RunError},
    runner::join_failure,
    subscribe::Bus,
};

/// Start every task at once and collect values in input order.
///
/// The first failure to arrive ends the run. Tasks still running at that point are
/// detached, not aborted: they finish in the background and their results are dropped.
/// A panicking task instead aborts everything still running.
///
/// Spawned tasks never touch the bus, so nothing is published after `RunFinished`.
pub(crate) async fn run<T, E>(tasks: Vec<TaskRef<T, E>>, bus: Bus) -> Result<Vec<T>, JoinAllError<E>>
where
    T: Send + 'static,
    E: Send + Debug + 'static,
{
    let total = tasks.len();
    bus.emit(EventKind::RunStarted, |e| e.with_total(total)).await;

    let mut names = Vec::with_capacity(total);
    let mut indices = HashMap::with_capacity(total);
    let mut set = JoinSet::new();
    for (index, task) in tasks.into_iter().enumerate() {
        let name = task.name().to_owned();
        bus.emit(EventKind::TaskClaimed, |e| e.with_index(index).with_task(name.as_str()))
            .await;
        names.push(name);

        let handle = set.spawn(async move { (index, task.run().await) });
        indices.insert(handle.id(), index);
    }

    let mut values: Vec<Option<T>> = std::iter::repeat_with(|| None).take(total).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, Ok(value))) => {
                bus.emit(EventKind::TaskSucceeded, |e| {
                    e.with_index(index).with_task(names[index].as_str())
                })
                .await;
                values[index] = Some(value);
            }
            Ok((index, Err(error))) => {
                set.detach_all();
                let reason = format!("{error:?}");
                debug!(target: "lanes.core.all", index, task = %names[index], %reason, "task failed; abandoning run");
                bus.emit(EventKind::TaskFailed, |e| {
                    e.with_index(index)
                        .with_task(names[index].as_str())
                        .with_reason(reason)
                })
                .await;
                bus.emit(EventKind::RunFinished, |e| e.with_total(total).with_failed(1))
                    .await;
                return Err(JoinAllError::Task { index, error });
            }
            Err(join) => {
                set.abort_all();
                let failure = match indices.get(&join.id()) {
                    Some(&index) => join_failure(index, join),
                    None => RunError::WorkerFailed(join.to_string()),
                };
                warn!(target: "lanes.core.all", error = %failure, "task join failed; aborting the rest");
                bus.emit(EventKind::RunFinished, |e| e.with_total(total).with_failed(1))
                    .await;
                return Err(failure.into());
            }
        }
    }

    bus.emit(EventKind::RunFinished, |e| e.with_total(total).with_failed(0))
        .await;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| value.ok_or(JoinAllError::Run(RunError::SlotUnfilled(index))))
        .collect()
}
