use std::sync::Arc;

use chrono::NaiveDate;
use log::info;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::fetch::{ensure_concurrency_limit, RateSource};

pub mod aggregate;
pub mod dates;
pub mod workers;

pub use aggregate::{AggregateState, Aggregator, ExtremeRecord};
pub use dates::{is_business_day, spawn_date_producer, window_start, BusinessDays};
pub use workers::{spawn_worker_pool, WorkerOutputs};

/// Final state of one run together with how much work was scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub state: AggregateState,
    /// Business dates in the configured window.
    pub scheduled_days: usize,
    /// Set when the run was interrupted; `state` then covers only the drained part.
    pub cancelled: bool,
}

fn channel_capacity(scheduled_days: usize) -> usize {
    scheduled_days.max(1)
}

/// A token cancelled after every scheduled day was already drained did not cut the run short.
fn was_interrupted(cancel: &CancellationToken, state: &AggregateState, scheduled: usize) -> bool {
    cancel.is_cancelled() && state.processed() < scheduled
}

/// Fetch every business day in the configured window through a bounded worker pool and fold
/// the results into aggregate statistics.
pub async fn run_pipeline<S>(
    config: &PipelineConfig,
    source: Arc<S>,
    cancel: CancellationToken,
) -> Result<PipelineOutcome>
where
    S: RateSource + ?Sized + 'static,
{
    let dates = BusinessDays::trailing(config.now, config.window_days);
    let scheduled_days = dates.clone().count();
    let worker_count = ensure_concurrency_limit(config.worker_count);
    let capacity = channel_capacity(scheduled_days);

    info!(
        "fetching {scheduled_days} business days from {} to {} with {worker_count} workers",
        config.window_start().unwrap_or(NaiveDate::MIN),
        config.now
    );

    let (date_tx, date_rx) = mpsc::channel(capacity);
    let (snapshot_tx, snapshot_rx) = mpsc::channel(capacity);
    let (error_tx, error_rx) = mpsc::channel(capacity);

    let producer = spawn_date_producer(dates, date_tx, cancel.clone());
    let supervisor = spawn_worker_pool(
        worker_count,
        source,
        date_rx,
        WorkerOutputs {
            snapshots: snapshot_tx,
            errors: error_tx,
        },
        cancel.clone(),
    );

    let state = Aggregator::new(config.designated_currency.clone())
        .drain(snapshot_rx, error_rx)
        .await;

    producer.await?;
    supervisor.await?;

    let cancelled = was_interrupted(&cancel, &state, scheduled_days);
    if cancelled {
        info!(
            "run cancelled after {} of {scheduled_days} days",
            state.processed()
        );
    }

    Ok(PipelineOutcome {
        state,
        scheduled_days,
        cancelled,
    })
}
