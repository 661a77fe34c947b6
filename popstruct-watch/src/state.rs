//! Observation states of a single job

use popstruct_client::{ClientError, ErrorKind};
use popstruct_core::domain::job::{Job, JobStatus};
use popstruct_core::domain::result::ResultPreview;
use std::fmt;

/// Cloneable summary of a failed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl WatchFailure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<&ClientError> for WatchFailure {
    fn from(err: &ClientError) -> Self {
        Self::new(err.kind(), err.user_message())
    }
}

impl fmt::Display for WatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Where the observation of one job currently stands
///
/// ```text
/// Idle -> Loading -> Polling -> ... -> Polling -> Completed -> FetchingResults -> ResultsReady
///            |          |                  \                                   \-> ResultsError
///            |          |                   \-> Failed
///            \----------+-> Error (manual refresh returns to Loading)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum WatchState {
    /// Identifier bound, nothing requested yet
    Idle,
    /// First fetch in flight
    Loading,
    /// Job is pending or running; another fetch is scheduled
    Polling(Job),
    /// Job finished successfully; the preview fetch is about to start
    Completed(Job),
    /// Job finished with an error
    Failed(Job),
    /// Preview request in flight
    FetchingResults(Job),
    /// Preview available, with metrics and/or plots
    ResultsReady { job: Job, preview: ResultPreview },
    /// Preview failed or was empty; the archive download is the fallback
    ResultsError { job: Job, failure: WatchFailure },
    /// A job fetch failed; automatic polling stopped
    Error {
        failure: WatchFailure,
        last_known: Option<Job>,
    },
}

impl WatchState {
    /// No automatic work remains for this state
    ///
    /// `Error` counts as settled: it only moves again on a manual refresh.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            WatchState::Failed(_)
                | WatchState::ResultsReady { .. }
                | WatchState::ResultsError { .. }
                | WatchState::Error { .. }
        )
    }

    /// Latest known copy of the job
    pub fn job(&self) -> Option<&Job> {
        match self {
            WatchState::Idle | WatchState::Loading => None,
            WatchState::Polling(job)
            | WatchState::Completed(job)
            | WatchState::Failed(job)
            | WatchState::FetchingResults(job)
            | WatchState::ResultsReady { job, .. }
            | WatchState::ResultsError { job, .. } => Some(job),
            WatchState::Error { last_known, .. } => last_known.as_ref(),
        }
    }

    /// Latest known status of the job
    pub fn status(&self) -> Option<JobStatus> {
        self.job().map(|job| job.status)
    }

    /// Short name of the state, for logs
    pub fn label(&self) -> &'static str {
        match self {
            WatchState::Idle => "idle",
            WatchState::Loading => "loading",
            WatchState::Polling(_) => "polling",
            WatchState::Completed(_) => "completed",
            WatchState::Failed(_) => "failed",
            WatchState::FetchingResults(_) => "fetching-results",
            WatchState::ResultsReady { .. } => "results-ready",
            WatchState::ResultsError { .. } => "results-error",
            WatchState::Error { .. } => "error",
        }
    }
}
