//! Backend seams
//!
//! The watcher, the list refresher and the bulk deleter only need a handful
//! of calls. They are expressed as traits so tests can script responses;
//! [`ApiClient`] is the production implementation.

use async_trait::async_trait;
use popstruct_client::{ApiClient, Result};
use popstruct_core::domain::dataset::DatasetId;
use popstruct_core::domain::job::{Job, JobId};
use popstruct_core::domain::page::{DatasetPage, JobPage};
use popstruct_core::domain::result::{ResultArchive, ResultPreview};
use popstruct_core::dto::job::JobQuery;

/// Read access to jobs and their results
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Fetches the current state of one job
    async fn fetch_job(&self, job_id: JobId) -> Result<Job>;

    /// Fetches the metrics/plots preview of a completed job
    async fn fetch_preview(&self, job_id: JobId) -> Result<ResultPreview>;

    /// Fetches one page of the job list
    async fn list_jobs(&self, query: &JobQuery) -> Result<JobPage>;

    /// Downloads the full result archive
    async fn download_archive(&self, job_id: JobId) -> Result<ResultArchive>;
}

/// Listing and deletion of datasets
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Fetches one page of datasets
    async fn list_datasets(&self, page: u32, page_size: u32) -> Result<DatasetPage>;

    /// Deletes one dataset
    async fn delete_dataset(&self, dataset_id: DatasetId) -> Result<()>;
}

#[async_trait]
impl JobSource for ApiClient {
    async fn fetch_job(&self, job_id: JobId) -> Result<Job> {
        self.get_job(job_id).await
    }

    async fn fetch_preview(&self, job_id: JobId) -> Result<ResultPreview> {
        self.get_result_preview(job_id).await
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<JobPage> {
        ApiClient::list_jobs(self, query).await
    }

    async fn download_archive(&self, job_id: JobId) -> Result<ResultArchive> {
        self.download_results(job_id).await
    }
}

#[async_trait]
impl DatasetStore for ApiClient {
    async fn list_datasets(&self, page: u32, page_size: u32) -> Result<DatasetPage> {
        ApiClient::list_datasets(self, page, page_size).await
    }

    async fn delete_dataset(&self, dataset_id: DatasetId) -> Result<()> {
        ApiClient::delete_dataset(self, dataset_id).await
    }
}
