use std::sync::Arc;

use async_trait::async_trait;
use lanes_model::{EventKind, RunEvent, RunMode};

/// Receiver of [`RunEvent`]s published by a [`Runner`](crate::Runner).
///
/// Events are delivered inline from the lane that produced them, so a slow
/// subscriber slows that lane down.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    async fn on_event(&self, event: &RunEvent);

    fn name(&self) -> &'static str;
}

/// Per-run fan-out to the runner's subscribers.
#[derive(Clone)]
pub(crate) struct Bus {
    subscribers: Arc<[Arc<dyn Subscribe>]>,
    run: u64,
    mode: RunMode,
}

impl Bus {
    pub(crate) fn new(subscribers: Arc<[Arc<dyn Subscribe>]>, run: u64, mode: RunMode) -> Self {
        Self {
            subscribers,
            run,
            mode,
        }
    }

    /// Bus with nobody listening; used by the free-standing runner functions.
    pub(crate) fn silent(mode: RunMode) -> Self {
        Self::new(Arc::from(Vec::new()), 0, mode)
    }

    pub(crate) fn run(&self) -> u64 {
        self.run
    }

    /// Publish an event; `fill` is only evaluated when someone is listening.
    pub(crate) async fn emit(&self, kind: EventKind, fill: impl FnOnce(RunEvent) -> RunEvent) {
        if self.subscribers.is_empty() {
            return;
        }
        let event = fill(RunEvent::new(kind, self.run, self.mode));
        for sub in self.subscribers.iter() {
            sub.on_event(&event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Collect(Mutex<Vec<RunEvent>>);

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, event: &RunEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
        fn name(&self) -> &'static str {
            "collect"
        }
    }

    #[tokio::test]
    async fn emit_stamps_run_and_mode() {
        let sink = Arc::new(Collect(Mutex::new(Vec::new())));
        let subs: Vec<Arc<dyn Subscribe>> = vec![sink.clone() as Arc<dyn Subscribe>];
        let bus = Bus::new(subs.into(), 7, RunMode::Bounded);

        bus.emit(EventKind::TaskClaimed, |e| e.with_index(2)).await;

        let events = sink.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].run, 7);
        assert_eq!(events[0].mode, RunMode::Bounded);
        assert_eq!(events[0].index, Some(2));
    }

    #[tokio::test]
    async fn silent_bus_skips_event_construction() {
        let bus = Bus::silent(RunMode::All);
        bus.emit(EventKind::RunStarted, |_| unreachable!("no subscribers"))
            .await;
        assert_eq!(bus.run(), 0);
    }
}
