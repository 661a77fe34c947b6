//! PopStruct job watching
//!
//! Background logic behind the job views: per-job status polling with result
//! preview, job list refresh, result presentation, archive download and
//! dataset bulk deletion. Everything talks to the backend through the
//! [`JobSource`] and [`DatasetStore`] seams, implemented by
//! [`popstruct_client::ApiClient`].

pub mod config;
pub mod download;
pub mod listing;
pub mod poller;
pub mod presenter;
pub mod selection;
pub mod source;
pub mod state;

#[cfg(test)]
mod testing;

pub use config::WatchConfig;
pub use download::{DownloadedArchive, download_archive};
pub use listing::{JobListRefresher, ListState, ListSubscription};
pub use poller::{JobView, JobWatcher, WatchSubscription};
pub use presenter::{MetricCard, PlotTab, ResultView};
pub use selection::{BulkDeleteOutcome, ConfirmedDeletion, DatasetSelection, DeletionRequest};
pub use source::{DatasetStore, JobSource};
pub use state::{WatchFailure, WatchState};
