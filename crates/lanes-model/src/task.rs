use std::{borrow::Cow, future::Future, sync::Arc};

use async_trait::async_trait;

/// A zero-argument unit of asynchronous work.
///
/// Runners treat tasks as opaque: they call [`Task::run`] and store whatever comes back.
/// [`Task::name`] is only used for instrumentation (events and logs).
#[async_trait]
pub trait Task: Send + Sync {
    type Output: Send;
    type Error: Send;

    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Run the task once until it settles.
    async fn run(&self) -> Result<Self::Output, Self::Error>;
}

/// Shared handle to a task, the element type of every task list.
pub type TaskRef<T, E> = Arc<dyn Task<Output = T, Error = E>>;

/// [`Task`] backed by a closure that returns a future.
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F, Fut, T, E> TaskFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Build the task and wrap it into a [`TaskRef`].
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> TaskRef<T, E> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut, T, E> Task for TaskFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Output = T;
    type Error = E;

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<T, E> {
        (self.f)().await
    }
}

/// Turn a synchronous fallible closure into a task.
///
/// The closure runs inline on the polling thread, so it blocks every other lane
/// sharing that thread for as long as it takes.
pub fn from_sync<F, T, E>(name: impl Into<Cow<'static, str>>, f: F) -> TaskRef<T, E>
where
    F: Fn() -> Result<T, E> + Send + Sync + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    TaskFn::arc(name, move || std::future::ready(f()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn task_fn_runs_closure_each_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let task: TaskRef<usize, String> = TaskFn::arc("count", move || {
            let counter = Arc::clone(&counter);
            async move { Ok(counter.fetch_add(1, Ordering::SeqCst) + 1) }
        });

        assert_eq!(task.name(), "count");
        assert_eq!(task.run().await, Ok(1));
        assert_eq!(task.run().await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn task_fn_propagates_error() {
        let task: TaskRef<(), &'static str> = TaskFn::arc("boom", || async { Err("boom") });
        assert_eq!(task.run().await, Err("boom"));
    }

    #[tokio::test]
    async fn from_sync_wraps_plain_closure() {
        let ok = from_sync("double", || Ok::<_, String>(21 * 2));
        assert_eq!(ok.run().await, Ok(42));

        let failing = from_sync("parse", || "x".parse::<i32>().map_err(|e| e.to_string()));
        assert!(failing.run().await.is_err());
    }

    #[test]
    fn owned_names_are_accepted() {
        let name = format!("task-{}", 7);
        let task = TaskFn::new(name, || async { Ok::<_, ()>(()) });
        assert_eq!(task.name(), "task-7");
    }
}
