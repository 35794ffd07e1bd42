use async_trait::async_trait;
use lanes_model::{Task, TaskRef};
use tokio::time::Instant;
use tracing::info;

/// [`Task`] that logs how long its inner task took to settle.
pub struct Timed<T, E> {
    inner: TaskRef<T, E>,
}

impl<T, E> Timed<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new(inner: TaskRef<T, E>) -> Self {
        Self { inner }
    }

    pub fn arc(inner: TaskRef<T, E>) -> TaskRef<T, E> {
        std::sync::Arc::new(Self::new(inner))
    }
}

#[async_trait]
impl<T, E> Task for Timed<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(&self) -> Result<T, E> {
        let start = Instant::now();
        let outcome = self.inner.run().await;
        let elapsed = start.elapsed();
        info!(
            target: "lanes.exec.timed",
            task = self.inner.name(),
            elapsed_ms = elapsed.as_secs_f64() * 1_000.0,
            ok = outcome.is_ok(),
            "task settled",
        );
        outcome
    }
}
