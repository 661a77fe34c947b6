//! Scripted backends for unit tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use popstruct_client::{ClientError, Result};
use popstruct_core::domain::dataset::{Dataset, DatasetId};
use popstruct_core::domain::job::{AnalysisType, Job, JobId, JobStatus};
use popstruct_core::domain::page::{DatasetPage, JobPage};
use popstruct_core::domain::result::{Plot, ResultArchive, ResultPreview};
use popstruct_core::dto::job::JobQuery;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::source::{DatasetStore, JobSource};

pub(crate) fn timestamp() -> DateTime<Utc> {
    "2024-01-01T00:00:00Z".parse().unwrap()
}

pub(crate) fn job(id: JobId, status: JobStatus) -> Job {
    Job {
        id,
        name: format!("Full Analysis - job {}", id),
        analysis_type: AnalysisType::Full,
        status,
        progress_percent: 0,
        error_message: None,
        dataset_id: 7,
        dataset_name: Some("cohort".to_string()),
        user_id: Some(1),
        parameters: BTreeMap::new(),
        created_at: timestamp(),
        started_at: None,
        completed_at: (status == JobStatus::Completed).then(timestamp),
    }
}

pub(crate) fn preview(with_metrics: bool, with_plots: bool) -> ResultPreview {
    let mut preview = ResultPreview::default();
    if with_metrics {
        preview.metrics.insert("n_samples".to_string(), json!(120));
        preview.metrics.insert("n_variants".to_string(), json!(48213));
        preview
            .metrics
            .insert("variance_explained".to_string(), json!([0.21, 0.12, 0.05]));
    }
    if with_plots {
        preview.plots.push(Plot {
            name: "Pca Scatter".to_string(),
            filename: Some("pca_scatter.png".to_string()),
            data: "data:image/png;base64,aGVsbG8=".to_string(),
        });
    }
    preview
}

/// One scripted response
#[derive(Debug, Clone)]
pub(crate) enum Step<T> {
    Ok(T),
    Fail(u16, &'static str),
    NotReady(&'static str),
}

impl<T: Clone> Step<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Step::Ok(value) => Ok(value),
            Step::Fail(status, message) => Err(ClientError::api_error(status, message)),
            Step::NotReady(message) => Err(ClientError::NotReady(message.to_string())),
        }
    }
}

/// Job source replaying scripted statuses; the last step repeats forever
#[derive(Default)]
pub(crate) struct MockSource {
    scripts: Mutex<HashMap<JobId, VecDeque<Step<JobStatus>>>>,
    last: Mutex<HashMap<JobId, Step<JobStatus>>>,
    gates: Mutex<HashMap<JobId, Arc<Notify>>>,
    preview: Mutex<Option<Step<ResultPreview>>>,
    listings: Mutex<VecDeque<Step<JobPage>>>,
    download: Mutex<Option<Step<Vec<u8>>>>,
    fetches: Mutex<Vec<(JobId, Instant)>>,
    pub preview_fetches: AtomicUsize,
    pub list_fetches: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, job_id: JobId, steps: Vec<Step<JobStatus>>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(job_id, steps.into_iter().collect());
    }

    pub fn statuses(&self, job_id: JobId, statuses: &[JobStatus]) {
        self.script(job_id, statuses.iter().copied().map(Step::Ok).collect());
    }

    /// Makes fetches of `job_id` wait until [`MockSource::release`]
    pub fn gate(&self, job_id: JobId) {
        self.gates
            .lock()
            .unwrap()
            .insert(job_id, Arc::new(Notify::new()));
    }

    pub fn release(&self, job_id: JobId) {
        if let Some(gate) = self.gates.lock().unwrap().remove(&job_id) {
            gate.notify_waiters();
        }
    }

    pub fn set_preview(&self, step: Step<ResultPreview>) {
        *self.preview.lock().unwrap() = Some(step);
    }

    pub fn push_listing(&self, step: Step<JobPage>) {
        self.listings.lock().unwrap().push_back(step);
    }

    pub fn set_download(&self, step: Step<Vec<u8>>) {
        *self.download.lock().unwrap() = Some(step);
    }

    pub fn fetch_count(&self, job_id: JobId) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == job_id)
            .count()
    }

    pub fn fetch_instants(&self, job_id: JobId) -> Vec<Instant> {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == job_id)
            .map(|(_, at)| *at)
            .collect()
    }

    fn next_status(&self, job_id: JobId) -> Step<JobStatus> {
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&job_id)
            .and_then(VecDeque::pop_front);

        let mut last = self.last.lock().unwrap();
        match next {
            Some(step) => {
                last.insert(job_id, step.clone());
                step
            }
            None => last
                .get(&job_id)
                .cloned()
                .unwrap_or(Step::Fail(404, "Job not found")),
        }
    }
}

#[async_trait]
impl JobSource for MockSource {
    async fn fetch_job(&self, job_id: JobId) -> Result<Job> {
        self.fetches.lock().unwrap().push((job_id, Instant::now()));

        let gate = self.gates.lock().unwrap().get(&job_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.next_status(job_id)
            .into_result()
            .map(|status| job(job_id, status))
    }

    async fn fetch_preview(&self, _job_id: JobId) -> Result<ResultPreview> {
        self.preview_fetches.fetch_add(1, Ordering::SeqCst);
        self.preview
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Step::NotReady("No results found for this job"))
            .into_result()
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<JobPage> {
        self.list_fetches.fetch_add(1, Ordering::SeqCst);
        let step = self.listings.lock().unwrap().pop_front();
        match step {
            Some(step) => step.into_result(),
            None => Ok(JobPage {
                jobs: Vec::new(),
                total: 0,
                page: query.page,
                page_size: query.page_size,
            }),
        }
    }

    async fn download_archive(&self, job_id: JobId) -> Result<ResultArchive> {
        self.download
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Step::NotReady("Result file not found"))
            .into_result()
            .map(|bytes| ResultArchive::new(job_id, bytes))
    }
}

pub(crate) fn dataset(id: DatasetId) -> Dataset {
    Dataset {
        id,
        name: format!("cohort-{}", id),
        description: None,
        file_type: "vcf".to_string(),
        file_size_mb: 1.5,
        n_samples: Some(120),
        n_variants: Some(48213),
        owner_id: 1,
        created_at: timestamp(),
        updated_at: None,
    }
}

/// Dataset store backed by a vector; deletions of `failing` ids are refused
pub(crate) struct MockDatasets {
    datasets: Mutex<Vec<Dataset>>,
    failing: HashSet<DatasetId>,
    pub deletes: Mutex<Vec<DatasetId>>,
    pub list_fetches: AtomicUsize,
}

impl MockDatasets {
    pub fn new(ids: impl IntoIterator<Item = DatasetId>, failing: &[DatasetId]) -> Arc<Self> {
        Arc::new(Self {
            datasets: Mutex::new(ids.into_iter().map(dataset).collect()),
            failing: failing.iter().copied().collect(),
            deletes: Mutex::new(Vec::new()),
            list_fetches: AtomicUsize::new(0),
        })
    }

    pub fn remaining(&self) -> Vec<DatasetId> {
        self.datasets.lock().unwrap().iter().map(|d| d.id).collect()
    }
}

#[async_trait]
impl DatasetStore for MockDatasets {
    async fn list_datasets(&self, page: u32, page_size: u32) -> Result<DatasetPage> {
        self.list_fetches.fetch_add(1, Ordering::SeqCst);
        let all = self.datasets.lock().unwrap().clone();
        let start = ((page.max(1) - 1) * page_size) as usize;
        Ok(DatasetPage {
            total: all.len() as u64,
            datasets: all.into_iter().skip(start).take(page_size as usize).collect(),
            page,
            page_size,
        })
    }

    async fn delete_dataset(&self, dataset_id: DatasetId) -> Result<()> {
        self.deletes.lock().unwrap().push(dataset_id);
        if self.failing.contains(&dataset_id) {
            return Err(ClientError::api_error(500, "Failed to delete dataset file"));
        }
        self.datasets.lock().unwrap().retain(|d| d.id != dataset_id);
        Ok(())
    }
}
