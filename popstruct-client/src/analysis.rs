//! Analysis submission endpoints

use popstruct_core::domain::job::{AnalysisType, Job};
use popstruct_core::dto::analysis::CreateAnalysis;
use tracing::info;

use crate::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Submit an analysis against a dataset
    ///
    /// # Arguments
    /// * `analysis` - Which analysis to run
    /// * `req` - Job name, dataset and parameters
    ///
    /// # Returns
    /// The created job, normally still `pending`
    pub async fn submit_analysis(&self, analysis: AnalysisType, req: &CreateAnalysis) -> Result<Job> {
        let url = self.url(&format!("/analysis/{}", analysis.endpoint()));
        let response = self.send_authorized(|c| c.post(&url).json(req)).await?;

        let job: Job = self.handle_response(response).await?;
        info!(
            "Submitted {} job {} on dataset {}",
            analysis.endpoint(),
            job.id,
            req.dataset_id
        );
        Ok(job)
    }
}
