//! Job watcher
//!
//! Observes one job until it reaches a terminal status, then fetches its
//! result preview exactly once. Each observation runs in its own task and
//! publishes [`WatchState`] values on a watch channel.
//!
//! A fetch is only scheduled after the previous one resolved, so there is
//! never more than one request in flight per observation. Cancelling the
//! subscription stops the task at its next await point and suppresses any
//! state the task would publish afterwards.

use popstruct_client::ErrorKind;
use popstruct_core::domain::job::{Job, JobId, JobStatus};
use popstruct_core::domain::result::PreviewContent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::source::JobSource;
use crate::state::{WatchFailure, WatchState};

/// Message shown when a completed job has nothing to preview
pub const NO_RESULTS_MESSAGE: &str = "No results available yet";

/// Spawns job observations
#[derive(Clone)]
pub struct JobWatcher {
    source: Arc<dyn JobSource>,
    poll_interval: Duration,
}

impl JobWatcher {
    /// Creates a watcher polling `source` at the configured job cadence
    pub fn new(source: Arc<dyn JobSource>, config: &WatchConfig) -> Self {
        Self {
            source,
            poll_interval: config.job_poll_interval,
        }
    }

    /// Starts observing one job
    ///
    /// The returned subscription starts in [`WatchState::Idle`]; the first
    /// fetch happens as soon as the spawned task runs. Dropping the
    /// subscription cancels the observation.
    pub fn observe(&self, job_id: JobId) -> WatchSubscription {
        let (state_tx, state_rx) = watch::channel(WatchState::Idle);
        let cancel = CancellationToken::new();
        let refresh = Arc::new(Notify::new());

        let observation = Observation {
            job_id,
            source: Arc::clone(&self.source),
            poll_interval: self.poll_interval,
            cancel: cancel.clone(),
            refresh: Arc::clone(&refresh),
            state: state_tx,
        };
        let handle = tokio::spawn(observation.run());

        WatchSubscription {
            job_id,
            state: state_rx,
            cancel,
            refresh,
            handle,
        }
    }
}

/// Handle on a running observation
pub struct WatchSubscription {
    job_id: JobId,
    state: watch::Receiver<WatchState>,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl WatchSubscription {
    /// Job being observed
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Snapshot of the current state
    pub fn state(&self) -> WatchState {
        self.state.borrow().clone()
    }

    /// Independent receiver for the state channel
    pub fn receiver(&self) -> watch::Receiver<WatchState> {
        self.state.clone()
    }

    /// Waits for the next published state
    ///
    /// Returns `None` once the observation has stopped and no further states
    /// will follow.
    pub async fn changed(&mut self) -> Option<WatchState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Waits until the state satisfies `predicate`
    ///
    /// If the observation stops first, the last published state is returned.
    pub async fn wait_until<F>(&mut self, predicate: F) -> WatchState
    where
        F: FnMut(&WatchState) -> bool,
    {
        if let Ok(state) = self.state.wait_for(predicate).await {
            return state.clone();
        }
        self.state.borrow().clone()
    }

    /// Waits until no automatic work remains
    pub async fn settled(&mut self) -> WatchState {
        self.wait_until(WatchState::is_settled).await
    }

    /// Requests an immediate fetch
    ///
    /// Resumes polling after an error and shortens the current wait while
    /// polling. Repeated requests before the next fetch count as one. Has no
    /// effect once the job reached a terminal status.
    pub fn refresh(&self) {
        debug!("Manual refresh requested for job {}", self.job_id);
        self.refresh.notify_one();
    }

    /// Stops the observation; calling it again is a no-op
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            debug!("Cancelling observation of job {}", self.job_id);
            self.cancel.cancel();
        }
    }

    /// Whether [`WatchSubscription::cancel`] was called
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the observation task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for WatchSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Keeps at most one observation alive for the job currently shown
///
/// Binding a new identifier cancels the previous observation before the new
/// one starts, so a late response for the old job can never reach the view.
pub struct JobView {
    watcher: JobWatcher,
    current: Option<WatchSubscription>,
}

impl JobView {
    pub fn new(watcher: JobWatcher) -> Self {
        Self {
            watcher,
            current: None,
        }
    }

    /// Shows `job_id`, replacing any other observation
    pub fn bind(&mut self, job_id: JobId) -> &mut WatchSubscription {
        if let Some(previous) = self.current.take() {
            if previous.job_id() == job_id && !previous.is_cancelled() {
                return self.current.insert(previous);
            }
            info!(
                "Switching observation from job {} to job {}",
                previous.job_id(),
                job_id
            );
            previous.cancel();
        }

        self.current.insert(self.watcher.observe(job_id))
    }

    /// Stops showing any job
    pub fn unbind(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.cancel();
        }
    }

    pub fn current_job_id(&self) -> Option<JobId> {
        self.current.as_ref().map(WatchSubscription::job_id)
    }

    /// State of the bound observation, `Idle` when nothing is bound
    pub fn state(&self) -> WatchState {
        self.current
            .as_ref()
            .map(WatchSubscription::state)
            .unwrap_or(WatchState::Idle)
    }

    pub fn subscription_mut(&mut self) -> Option<&mut WatchSubscription> {
        self.current.as_mut()
    }
}

enum Outcome {
    /// Terminal state published
    Done,
    /// Fetch failed; waiting for a manual refresh
    Errored,
    Cancelled,
}

struct Observation {
    job_id: JobId,
    source: Arc<dyn JobSource>,
    poll_interval: Duration,
    cancel: CancellationToken,
    refresh: Arc<Notify>,
    state: watch::Sender<WatchState>,
}

impl Observation {
    async fn run(self) {
        info!(
            "Observing job {} (interval: {:?})",
            self.job_id, self.poll_interval
        );

        let mut last_known: Option<Job> = None;

        loop {
            match self.poll_until_settled(&mut last_known).await {
                Outcome::Done | Outcome::Cancelled => break,
                Outcome::Errored => {
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => break,
                        _ = self.refresh.notified() => {
                            info!("Retrying job {} after manual refresh", self.job_id);
                        }
                    }
                }
            }
        }

        debug!("Observation of job {} stopped", self.job_id);
    }

    /// `last_known` outlives manual retries so later errors still carry it
    async fn poll_until_settled(&self, last_known: &mut Option<Job>) -> Outcome {
        self.publish(WatchState::Loading);

        loop {
            let fetched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Outcome::Cancelled,
                fetched = self.source.fetch_job(self.job_id) => fetched,
            };

            let job = match fetched {
                Ok(job) => job,
                Err(e) => {
                    warn!("Failed to fetch job {}: {}", self.job_id, e);
                    self.publish(WatchState::Error {
                        failure: WatchFailure::from(&e),
                        last_known: last_known.clone(),
                    });
                    return Outcome::Errored;
                }
            };

            match job.status {
                JobStatus::Pending | JobStatus::Running => {
                    debug!(
                        "Job {} is {} ({}%)",
                        job.id, job.status, job.progress_percent
                    );
                    *last_known = Some(job.clone());
                    self.discard_pending_refresh().await;
                    self.publish(WatchState::Polling(job));

                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => return Outcome::Cancelled,
                        _ = self.refresh.notified() => {}
                        _ = time::sleep(self.poll_interval) => {}
                    }
                }
                JobStatus::Failed => {
                    info!(
                        "Job {} failed: {}",
                        job.id,
                        job.error_message.as_deref().unwrap_or("no error message")
                    );
                    self.publish(WatchState::Failed(job));
                    return Outcome::Done;
                }
                JobStatus::Completed => {
                    info!("Job {} completed", job.id);
                    self.publish(WatchState::Completed(job.clone()));
                    return self.fetch_results(job).await;
                }
            }
        }
    }

    async fn fetch_results(&self, job: Job) -> Outcome {
        self.publish(WatchState::FetchingResults(job.clone()));

        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Outcome::Cancelled,
            fetched = self.source.fetch_preview(job.id) => fetched,
        };

        let next = match fetched {
            Ok(preview) if preview.content() == PreviewContent::Neither => {
                debug!("Preview of job {} has no metrics or plots", job.id);
                WatchState::ResultsError {
                    job,
                    failure: WatchFailure::new(ErrorKind::ResourceNotReady, NO_RESULTS_MESSAGE),
                }
            }
            Ok(preview) => {
                debug!(
                    "Preview of job {}: {} metric(s), {} plot(s)",
                    job.id,
                    preview.metrics.len(),
                    preview.plots.len()
                );
                WatchState::ResultsReady { job, preview }
            }
            Err(e) => {
                warn!("Failed to fetch preview of job {}: {}", job.id, e);
                WatchState::ResultsError {
                    job,
                    failure: WatchFailure::from(&e),
                }
            }
        };

        self.publish(next);
        Outcome::Done
    }

    /// Consumes a refresh permit stored while no one was waiting
    async fn discard_pending_refresh(&self) {
        tokio::select! {
            biased;
            _ = self.refresh.notified() => {
                debug!("Dropping stale refresh request for job {}", self.job_id);
            }
            _ = std::future::ready(()) => {}
        }
    }

    /// Publishes unless the observation was cancelled
    fn publish(&self, state: WatchState) {
        if self.cancel.is_cancelled() {
            return;
        }
        debug!("Job {} -> {}", self.job_id, state.label());
        self.state.send_replace(state);
    }
}
