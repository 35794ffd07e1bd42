use std::fmt::Debug;

use lanes_model::{EventKind, Settled, TaskRef};
use tracing::{debug, trace, warn};

use crate::{error::RunError, runner::contained, subscribe::Bus};

/// Run tasks one after another; every outcome is kept as a [`Settled`] record.
///
/// A panicking task ends the run; the tasks after it are never invoked.
pub(crate) async fn run<T, E>(
    tasks: Vec<TaskRef<T, E>>,
    bus: &Bus,
) -> Result<Vec<Settled<T, E>>, RunError>
where
    T: Send + 'static,
    E: Send + Debug + 'static,
{
    let total = tasks.len();
    bus.emit(EventKind::RunStarted, |e| e.with_total(total)).await;

    let mut settled = Vec::with_capacity(total);
    let mut failed = 0;

    for (index, task) in tasks.into_iter().enumerate() {
        let name = task.name().to_owned();
        trace!(target: "lanes.core.sequential", index, task = %name, "invoke");
        bus.emit(EventKind::TaskClaimed, |e| e.with_index(index).with_task(name.as_str()))
            .await;

        let outcome = match contained(index, task).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(target: "lanes.core.sequential", index, task = %name, error = %err, "task panicked; run abandoned");
                bus.emit(EventKind::TaskFailed, |e| {
                    e.with_index(index).with_task(name).with_reason(err.to_string())
                })
                .await;
                bus.emit(EventKind::RunFinished, |e| {
                    e.with_total(total).with_failed(failed + 1)
                })
                .await;
                return Err(err);
            }
        };

        let failure = outcome.as_ref().err().map(|err| format!("{err:?}"));
        match failure {
            None => {
                bus.emit(EventKind::TaskSucceeded, |e| e.with_index(index).with_task(name))
                    .await;
            }
            Some(reason) => {
                failed += 1;
                debug!(target: "lanes.core.sequential", index, task = %name, %reason, "task rejected");
                bus.emit(EventKind::TaskFailed, |e| {
                    e.with_index(index).with_task(name).with_reason(reason)
                })
                .await;
            }
        }
        settled.push(Settled::from(outcome));
    }

    bus.emit(EventKind::RunFinished, |e| e.with_total(total).with_failed(failed))
        .await;
    Ok(settled)
}
