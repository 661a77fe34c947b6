//! Result endpoints

use popstruct_core::domain::job::JobId;
use popstruct_core::domain::result::{ResultArchive, ResultPreview};

use crate::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Get the metrics and plots of a completed job
    ///
    /// Requests made before the backend has produced artifacts fail with
    /// [`ClientError::NotReady`](crate::ClientError::NotReady).
    pub async fn get_result_preview(&self, job_id: JobId) -> Result<ResultPreview> {
        let url = self.url(&format!("/results/{}/preview", job_id));
        let response = self.send_authorized(|c| c.get(&url)).await?;

        self.handle_response(response)
            .await
            .map_err(|e| e.into_not_ready())
    }

    /// Download the full result archive of a completed job
    ///
    /// # Returns
    /// The zip payload, named `job_<id>_results.zip`
    pub async fn download_results(&self, job_id: JobId) -> Result<ResultArchive> {
        let url = self.url(&format!("/jobs/{}/download", job_id));
        let response = self.send_authorized(|c| c.get(&url)).await?;

        let bytes = self
            .handle_bytes_response(response)
            .await
            .map_err(|e| e.into_not_ready())?;

        Ok(ResultArchive::new(job_id, bytes))
    }
}
