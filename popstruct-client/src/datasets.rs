//! Dataset endpoints

use popstruct_core::domain::dataset::{Dataset, DatasetId};
use popstruct_core::domain::page::DatasetPage;
use popstruct_core::dto::dataset::UploadDataset;
use reqwest::multipart::{Form, Part};
use tracing::info;

use crate::ApiClient;
use crate::error::{ClientError, Result};

impl ApiClient {
    // =============================================================================
    // Dataset Management
    // =============================================================================

    /// List datasets, one page at a time
    ///
    /// # Arguments
    /// * `page` - 1-based page number
    /// * `page_size` - Datasets per page
    pub async fn list_datasets(&self, page: u32, page_size: u32) -> Result<DatasetPage> {
        let url = self.url("/datasets");
        let response = self
            .send_authorized(|c| {
                c.get(&url)
                    .query(&[("page", page), ("page_size", page_size)])
            })
            .await?;

        self.handle_response(response).await
    }

    /// Get a dataset by ID
    pub async fn get_dataset(&self, dataset_id: DatasetId) -> Result<Dataset> {
        let url = self.url(&format!("/datasets/{}", dataset_id));
        let response = self.send_authorized(|c| c.get(&url)).await?;

        self.handle_response(response).await
    }

    /// Upload a genotype file as a new dataset
    ///
    /// The upload is validated locally first (extension, size, name) so an
    /// obviously bad file never leaves the machine.
    pub async fn upload_dataset(&self, req: UploadDataset) -> Result<Dataset> {
        req.validate().map_err(ClientError::InvalidRequest)?;

        let url = self.url("/datasets");
        info!(
            "Uploading {} ({:.2} MB) as dataset '{}'",
            req.file_name,
            req.size_mb(),
            req.name
        );

        // Multipart bodies are consumed on send, so the form is rebuilt for a retry
        let response = self
            .send_authorized(|c| {
                let file = Part::bytes(req.content.clone()).file_name(req.file_name.clone());
                let mut form = Form::new().part("file", file).text("name", req.name.clone());
                if let Some(description) = &req.description {
                    form = form.text("description", description.clone());
                }
                c.post(&url).multipart(form)
            })
            .await?;

        self.handle_response(response).await
    }

    /// Delete a dataset
    ///
    /// # Arguments
    /// * `dataset_id` - The dataset to delete
    pub async fn delete_dataset(&self, dataset_id: DatasetId) -> Result<()> {
        let url = self.url(&format!("/datasets/{}", dataset_id));
        let response = self.send_authorized(|c| c.delete(&url)).await?;

        self.handle_empty_response(response).await
    }
}
