//! Job poller
//!
//! Observes the job store and keeps the tracked job in sync with the server
//! while it is queued or running.
//!
//! A supervisor task watches the store. Whenever the tracked job changes it
//! decides which job (if any) must be polled, tears down the loop of a job
//! that no longer qualifies and starts a loop for the new one. At most one
//! per-job loop is alive at any time, and every loop is owned by a
//! cancellation token derived from the caller's.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::repository::StatusFetcher;
use crate::service::store::{JobStore, active_job_id};

/// Periodically queries the status of the tracked job
pub struct JobPoller {
    store: Arc<JobStore>,
    fetcher: Arc<dyn StatusFetcher>,
    interval: Duration,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(store: Arc<JobStore>, fetcher: Arc<dyn StatusFetcher>, interval: Duration) -> Self {
        Self {
            store,
            fetcher,
            interval,
        }
    }

    /// Runs the poller on a background task
    ///
    /// The poller stops when `shutdown` is cancelled or when the returned
    /// handle is shut down or dropped.
    pub fn spawn(self, shutdown: CancellationToken) -> PollerHandle {
        let token = shutdown.child_token();
        let task = tokio::spawn(self.run(token.clone()));

        PollerHandle {
            token,
            task: Some(task),
        }
    }

    /// Runs the supervisor loop until `shutdown` is cancelled
    pub async fn run(self, shutdown: CancellationToken) {
        info!("Starting job poller (interval: {:?})", self.interval);

        let mut updates = self.store.subscribe();
        let mut active: Option<PollLoop> = None;

        loop {
            let target = active_job_id(updates.borrow_and_update().as_ref());
            self.reconcile(&mut active, target, &shutdown).await;

            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = updates.changed() => {
                    if changed.is_err() {
                        debug!("Job store closed");
                        break;
                    }
                }
            }
        }

        if let Some(current) = active.take() {
            current.stop().await;
        }

        info!("Job poller stopped");
    }

    /// Makes the running loop match `target`
    async fn reconcile(
        &self,
        active: &mut Option<PollLoop>,
        target: Option<String>,
        shutdown: &CancellationToken,
    ) {
        // An exited loop is restarted even when the job id did not change
        if let Some(current) = active.as_ref() {
            if target.as_deref() == Some(current.job_id.as_str()) && !current.task.is_finished() {
                return;
            }
        }

        // The previous loop is fully torn down before a new one starts
        if let Some(current) = active.take() {
            current.stop().await;
        }

        if let Some(job_id) = target {
            *active = Some(self.start_loop(job_id, shutdown));
        }
    }

    fn start_loop(&self, job_id: String, shutdown: &CancellationToken) -> PollLoop {
        let token = shutdown.child_token();
        let task = tokio::spawn(poll_job(
            job_id.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.fetcher),
            self.interval,
            token.clone(),
        ));

        PollLoop {
            job_id,
            token,
            task,
        }
    }
}

/// A running per-job loop
struct PollLoop {
    job_id: String,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollLoop {
    async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.task.await {
            warn!("Poll loop for job {} panicked: {}", self.job_id, e);
        }
    }
}

/// Polls one job until it finishes, stops being tracked, or is cancelled
///
/// The first query goes out immediately. A query is only sent once the
/// previous one settled; ticks missed while waiting are delayed rather than
/// bunched up.
async fn poll_job(
    job_id: String,
    store: Arc<JobStore>,
    fetcher: Arc<dyn StatusFetcher>,
    interval: Duration,
    token: CancellationToken,
) {
    info!("Polling job {} every {:?}", job_id, interval);

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if store.active_job_id().as_deref() != Some(job_id.as_str()) {
            debug!("Job {} no longer needs polling", job_id);
            break;
        }

        tick += 1;
        debug!("Polling job {} (tick {})", job_id, tick);

        let result = tokio::select! {
            _ = token.cancelled() => break,
            result = fetcher.fetch_status(&job_id) => result,
        };

        let mut update = match result {
            Ok(update) => update,
            Err(e) => {
                warn!("Failed to poll job {} (tick {}): {:#}", job_id, tick, e);
                continue;
            }
        };

        if token.is_cancelled() {
            break;
        }

        update.id.get_or_insert_with(|| job_id.clone());
        update.updated_at.get_or_insert_with(Utc::now);

        match store.update_status(update) {
            Some(job) if job.is_terminal() => {
                info!("Job {} finished with status {}", job.id, job.status);
                break;
            }
            Some(job) => debug!("Job {} is {} ({}%): {}", job.id, job.status, job.progress, job.stage),
            None => debug!("Status of job {} was not applied", job_id),
        }
    }

    debug!("Stopped polling job {}", job_id);
}

/// Handle to a spawned poller
///
/// Dropping the handle cancels the poller without waiting for it.
pub struct PollerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Cancels the poller and waits until every loop is torn down
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Job poller panicked: {}", e);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
