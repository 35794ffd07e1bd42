use std::fmt::Debug;

use async_trait::async_trait;
use lanes_model::{ConfigError, RetryPolicy, Task, TaskRef};
use tracing::{debug, warn};

use crate::util::sleep;

/// Run `task` until it succeeds or `policy.attempts` attempts have failed.
///
/// Waits [`RetryPolicy::delay_for`] between attempts and returns the last failure
/// once the attempts are used up. A policy with `attempts == 0` still runs the task once.
pub async fn retry<K>(task: &K, policy: &RetryPolicy) -> Result<K::Output, K::Error>
where
    K: Task + ?Sized,
    K::Error: Debug,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match task.run().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(target: "lanes.exec.retry", task = task.name(), attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if attempt < attempts => {
                let delay = policy.delay_for(attempt - 1);
                warn!(
                    target: "lanes.exec.retry",
                    task = task.name(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    ?error,
                    "attempt failed; retry scheduled",
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                warn!(target: "lanes.exec.retry", task = task.name(), attempts, ?error, "attempts exhausted");
                return Err(error);
            }
        }
    }
}

/// [`Task`] that retries its inner task according to a [`RetryPolicy`].
///
/// Runners still invoke a `Retry` exactly once; the repeated calls happen inside it.
pub struct Retry<T, E> {
    inner: TaskRef<T, E>,
    policy: RetryPolicy,
}

impl<T, E> Retry<T, E>
where
    T: Send + 'static,
    E: Send + Debug + 'static,
{
    pub fn new(inner: TaskRef<T, E>, policy: RetryPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self { inner, policy })
    }

    pub fn arc(inner: TaskRef<T, E>, policy: RetryPolicy) -> Result<TaskRef<T, E>, ConfigError> {
        Ok(std::sync::Arc::new(Self::new(inner, policy)?))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<T, E> Task for Retry<T, E>
where
    T: Send + 'static,
    E: Send + Debug + 'static,
{
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn run(&self) -> Result<T, E> {
        retry(self.inner.as_ref(), &self.policy).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanes_model::TaskFn;
    use std::{
        sync::{
            Arc,
            atomic::{AtomicU32, Ordering},
        },
        time::Duration,
    };
    use tokio::time::Instant;

    /// Fails until it has been called `succeed_on` times.
    fn flaky(succeed_on: u32) -> (TaskRef<u32, String>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let task = TaskFn::arc("flaky", move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n >= succeed_on {
                    Ok(n)
                } else {
                    Err(format!("attempt {n} failed"))
                }
            }
        });
        (task, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_first_try_without_waiting() {
        let (task, calls) = flaky(1);
        let start = Instant::now();

        let out = retry(task.as_ref(), &RetryPolicy::default()).await;

        assert_eq!(out, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn backs_off_between_attempts() {
        let (task, calls) = flaky(3);
        let policy = RetryPolicy::new(3).with_first_ms(100);
        let start = Instant::now();

        let out = retry(task.as_ref(), &policy).await;

        assert_eq!(out, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 100ms before the second attempt, 200ms before the third
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(320), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_failure_when_exhausted() {
        let (task, calls) = flaky(10);
        let policy = RetryPolicy::new(2).with_first_ms(10);

        let out = retry(task.as_ref(), &policy).await;

        assert_eq!(out, Err("attempt 2 failed".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn wrapper_keeps_inner_name() {
        let (task, _) = flaky(2);
        let wrapped = Retry::arc(task, RetryPolicy::new(2).with_first_ms(1)).unwrap();

        assert_eq!(wrapped.name(), "flaky");
        assert_eq!(wrapped.run().await, Ok(2));
    }

    #[test]
    fn wrapper_rejects_invalid_policy() {
        let (task, _) = flaky(1);
        assert!(matches!(
            Retry::new(task, RetryPolicy::new(0)),
            Err(ConfigError::ZeroAttempts)
        ));
    }
}
