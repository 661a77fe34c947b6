//! Result domain types
//!
//! A completed job exposes two kinds of output: a lightweight preview
//! (summary metrics plus rendered plots) and the full zip archive.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::job::JobId;
use crate::serde_util::null_as_default;

/// Metrics and plots for one completed job
///
/// Plots may legitimately be empty while metrics are populated: the backend
/// only keeps images on ephemeral storage. Use [`ResultPreview::content`]
/// rather than ad-hoc emptiness checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultPreview {
    #[serde(default)]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub job_name: Option<String>,
    #[serde(default)]
    pub analysis_type: Option<String>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: BTreeMap<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub plots: Vec<Plot>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Which parts of a preview carry data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewContent {
    MetricsOnly,
    PlotsOnly,
    Both,
    Neither,
}

impl PreviewContent {
    pub fn has_metrics(self) -> bool {
        matches!(self, PreviewContent::MetricsOnly | PreviewContent::Both)
    }

    pub fn has_plots(self) -> bool {
        matches!(self, PreviewContent::PlotsOnly | PreviewContent::Both)
    }
}

impl ResultPreview {
    pub fn content(&self) -> PreviewContent {
        match (self.metrics.is_empty(), self.plots.is_empty()) {
            (false, true) => PreviewContent::MetricsOnly,
            (true, false) => PreviewContent::PlotsOnly,
            (false, false) => PreviewContent::Both,
            (true, true) => PreviewContent::Neither,
        }
    }

    /// Number of samples analysed (`n_samples`)
    pub fn sample_count(&self) -> Option<u64> {
        self.metrics.get("n_samples").and_then(Value::as_u64)
    }

    /// Number of variants analysed (`n_variants`)
    pub fn variant_count(&self) -> Option<u64> {
        self.metrics.get("n_variants").and_then(Value::as_u64)
    }

    /// Proportion of variance explained per principal component
    pub fn variance_explained(&self) -> Option<Vec<f64>> {
        let values = self.metrics.get("variance_explained")?.as_array()?;
        values.iter().map(Value::as_f64).collect()
    }

    /// Number of k-means clusters (`n_clusters`)
    pub fn cluster_count(&self) -> Option<u64> {
        self.metrics.get("n_clusters").and_then(Value::as_u64)
    }

    pub fn silhouette_score(&self) -> Option<f64> {
        self.metrics.get("silhouette_score").and_then(Value::as_f64)
    }
}

/// A named plot image embedded in a preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub name: String,
    #[serde(default)]
    pub filename: Option<String>,
    /// Image payload, normally a `data:image/png;base64,...` URL
    pub data: String,
}

impl Plot {
    /// Media type declared by the data URL, `image/png` when absent
    pub fn media_type(&self) -> &str {
        self.data
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(media, _)| media)
            .filter(|media| !media.is_empty())
            .unwrap_or("image/png")
    }

    /// Decodes the embedded image
    pub fn image_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        let encoded = match self.data.split_once(";base64,") {
            Some((_, payload)) => payload,
            None => self.data.as_str(),
        };
        STANDARD.decode(encoded.trim())
    }
}

/// Downloaded result archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArchive {
    pub job_id: JobId,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ResultArchive {
    pub fn new(job_id: JobId, bytes: Vec<u8>) -> Self {
        Self {
            job_id,
            file_name: Self::file_name_for(job_id),
            bytes,
        }
    }

    /// Archive name for a job: `job_<id>_results.zip`
    pub fn file_name_for(job_id: JobId) -> String {
        format!("job_{}_results.zip", job_id)
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}
