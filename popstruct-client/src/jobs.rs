//! Job endpoints

use popstruct_core::domain::job::{Job, JobId};
use popstruct_core::domain::page::JobPage;
use popstruct_core::dto::job::JobQuery;

use crate::ApiClient;
use crate::error::Result;

impl ApiClient {
    // =============================================================================
    // Job Queries
    // =============================================================================

    /// List jobs, newest first
    ///
    /// # Arguments
    /// * `query` - Page, page size and optional status filter
    ///
    /// # Example
    /// ```no_run
    /// # use popstruct_client::{ApiClient, MemorySession};
    /// # use popstruct_core::domain::job::JobStatus;
    /// # use popstruct_core::dto::job::JobQuery;
    /// # use std::sync::Arc;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = ApiClient::new("http://localhost:8000", Arc::new(MemorySession::new()));
    /// let running = client
    ///     .list_jobs(&JobQuery::new(1, 10).with_status(JobStatus::Running))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_jobs(&self, query: &JobQuery) -> Result<JobPage> {
        let url = self.url("/jobs");
        let response = self.send_authorized(|c| c.get(&url).query(query)).await?;

        self.handle_response(response).await
    }

    /// Get a job by ID
    ///
    /// # Arguments
    /// * `job_id` - The job ID
    ///
    /// # Returns
    /// The job with its current status
    pub async fn get_job(&self, job_id: JobId) -> Result<Job> {
        let url = self.url(&format!("/jobs/{}", job_id));
        let response = self.send_authorized(|c| c.get(&url)).await?;

        self.handle_response(response).await
    }

    /// Delete a job and its results
    pub async fn delete_job(&self, job_id: JobId) -> Result<()> {
        let url = self.url(&format!("/jobs/{}", job_id));
        let response = self.send_authorized(|c| c.delete(&url)).await?;

        self.handle_empty_response(response).await
    }
}
