use async_trait::async_trait;
use lanes_core::Subscribe;
use lanes_model::RunEvent;

use crate::subscriber::view::log_event;

/// Subscriber that writes every runner event to the `tracing` logger.
#[derive(Debug, Default)]
pub struct Journal;

impl Journal {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for Journal {
    async fn on_event(&self, event: &RunEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}
