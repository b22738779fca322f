use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, error, info};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::fetch::{DailySnapshot, RateSource};

/// Date queue shared by every worker; whoever locks it first takes the next date.
pub type SharedDates = Arc<Mutex<mpsc::Receiver<NaiveDate>>>;

/// Output side of the pool. Dropping the last clone closes the aggregator's inputs.
#[derive(Debug, Clone)]
pub struct WorkerOutputs {
    pub snapshots: mpsc::Sender<DailySnapshot>,
    pub errors: mpsc::Sender<FetchError>,
}

/// Spawn `worker_count` fetch workers plus a supervisor that closes the outputs once all of
/// them have exited. The returned handle resolves to the number of workers that ran.
pub fn spawn_worker_pool<S>(
    worker_count: usize,
    source: Arc<S>,
    dates: mpsc::Receiver<NaiveDate>,
    outputs: WorkerOutputs,
    cancel: CancellationToken,
) -> JoinHandle<usize>
where
    S: RateSource + ?Sized + 'static,
{
    let dates: SharedDates = Arc::new(Mutex::new(dates));

    let workers: Vec<JoinHandle<()>> = (0..worker_count)
        .map(|worker_id| {
            tokio::spawn(run_worker(
                worker_id,
                Arc::clone(&source),
                Arc::clone(&dates),
                outputs.clone(),
                cancel.clone(),
            ))
        })
        .collect();

    tokio::spawn(async move {
        let spawned = workers.len();
        for result in futures::future::join_all(workers).await {
            if let Err(err) = result {
                error!("fetch worker terminated abnormally: {err}");
            }
        }
        // Workers hold their own clones; this drop releases the last senders.
        drop(outputs);
        info!("all {spawned} fetch workers finished");
        spawned
    })
}

async fn run_worker<S>(
    worker_id: usize,
    source: Arc<S>,
    dates: SharedDates,
    outputs: WorkerOutputs,
    cancel: CancellationToken,
) where
    S: RateSource + ?Sized,
{
    debug!("worker {worker_id} started");
    let mut handled = 0usize;

    loop {
        let next = {
            let mut queue = dates.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                date = queue.recv() => date,
            }
        };
        let Some(date) = next else {
            break;
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("worker {worker_id} abandoned {date}");
                break;
            }
            outcome = source.fetch_snapshot(date) => outcome,
        };

        let delivered = match outcome {
            Ok(snapshot) => outputs.snapshots.send(snapshot).await.is_ok(),
            Err(error) => outputs.errors.send(error).await.is_ok(),
        };
        if !delivered {
            debug!("worker {worker_id} lost its consumer");
            break;
        }
        handled += 1;
    }

    debug!("worker {worker_id} exiting after {handled} dates");
}
