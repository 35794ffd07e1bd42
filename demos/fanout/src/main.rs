use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use anyhow::Context;
use lanes_core::{Runner, Subscribe};
use lanes_exec::{Retry, Timed, sleep_ms};
use lanes_model::{RetryPolicy, RunnerConfig, Settled, TaskFn, TaskRef};
use lanes_observe::{Journal, LoggerConfig, LoggerFormat, logger_init};
use tracing::info;

fn delayed(id: u32, ms: u64) -> TaskRef<u32, String> {
    Timed::arc(TaskFn::arc(format!("delayed-{id}"), move || async move {
        sleep_ms(ms).await;
        Ok(id)
    }))
}

fn failing(id: u32, ms: u64) -> TaskRef<u32, String> {
    TaskFn::arc(format!("failing-{id}"), move || async move {
        sleep_ms(ms).await;
        Err(format!("task {id} gave up"))
    })
}

/// Fails on its first call, succeeds afterwards.
fn flaky(id: u32) -> TaskRef<u32, String> {
    let calls = Arc::new(AtomicU32::new(0));
    TaskFn::arc(format!("flaky-{id}"), move || {
        let first = calls.fetch_add(1, Ordering::SeqCst) == 0;
        async move {
            sleep_ms(15).await;
            if first {
                Err(format!("task {id} hiccup"))
            } else {
                Ok(id)
            }
        }
    })
}

fn logger_config() -> anyhow::Result<LoggerConfig> {
    let mut cfg = LoggerConfig::default();
    if let Ok(format) = std::env::var("LANES_LOG_FORMAT") {
        cfg = cfg.with_format(format.parse::<LoggerFormat>()?);
    }
    if let Ok(level) = std::env::var("LANES_LOG") {
        cfg = cfg.with_level(level);
    }
    Ok(cfg)
}

fn runner_config() -> anyhow::Result<RunnerConfig> {
    match std::env::var("LANES_MAX_CONCURRENCY") {
        Ok(raw) => {
            let limit = raw
                .parse()
                .with_context(|| format!("LANES_MAX_CONCURRENCY={raw:?} is not a number"))?;
            Ok(RunnerConfig::new(limit))
        }
        Err(_) => Ok(RunnerConfig::new(2)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger_init(&logger_config()?)?;

    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Journal::new())];
    let runner = Runner::new(runner_config()?)?.with_subscribers(subscribers);
    info!(limit = runner.config().max_concurrency, "runner ready");

    let policy = RetryPolicy::new(3).with_first_ms(20);
    let tasks = vec![
        delayed(1, 30),
        delayed(2, 10),
        failing(3, 5),
        Retry::arc(flaky(4), policy)?,
        delayed(5, 20),
    ];
    let bounded = runner.bounded(tasks).await?;
    for (index, slot) in bounded.iter().enumerate() {
        match slot {
            Ok(value) => info!(index, value, "bounded slot"),
            Err(reason) => info!(index, %reason, "bounded slot failed"),
        }
    }

    let sequential = runner
        .sequential(vec![failing(10, 5), delayed(11, 5)])
        .await?;
    for settled in &sequential {
        match settled {
            Settled::Fulfilled { value } => info!(value, "sequential fulfilled"),
            Settled::Rejected { reason } => info!(%reason, "sequential rejected"),
        }
    }

    match runner.all(vec![delayed(20, 10), failing(21, 5)]).await {
        Ok(values) => info!(?values, "all succeeded"),
        Err(err) => info!(error = %err, "all failed"),
    }

    let values = runner.all(vec![delayed(30, 10), delayed(31, 5)]).await?;
    info!(?values, "all succeeded");

    Ok(())
}
