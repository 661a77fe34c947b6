//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::serde_util::null_as_default;

/// Identifier of an analysis job
pub type JobId = i64;

/// One submitted analysis run against a dataset
///
/// Structure owned by the backend job service; the client only observes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub name: String,
    pub analysis_type: AnalysisType,
    pub status: JobStatus,
    #[serde(default)]
    pub progress_percent: i32,
    #[serde(default)]
    pub error_message: Option<String>,
    pub dataset_id: i64,
    #[serde(default)]
    pub dataset_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Whether the backend will make no further transitions for this job
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Wall-clock run time, when both ends are known
    pub fn duration(&self) -> Option<chrono::Duration> {
        let started = self.started_at?;
        let completed = self.completed_at?;
        Some(completed.signed_duration_since(started))
    }
}

/// Job lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// `completed` and `failed` are terminal
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Wire representation, as used by the `status_filter` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            other => Err(format!(
                "unknown job status '{}' (expected pending, running, completed or failed)",
                other
            )),
        }
    }
}

/// Kind of population-structure analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisType {
    #[serde(rename = "pca")]
    Pca,
    #[serde(rename = "clustering")]
    Clustering,
    #[serde(rename = "kinship")]
    Kinship,
    #[serde(rename = "full_analysis", alias = "full")]
    Full,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 4] = [
        AnalysisType::Pca,
        AnalysisType::Clustering,
        AnalysisType::Kinship,
        AnalysisType::Full,
    ];

    /// Path segment of the submission endpoint (`/analysis/{segment}`)
    pub fn endpoint(self) -> &'static str {
        match self {
            AnalysisType::Pca => "pca",
            AnalysisType::Clustering => "clustering",
            AnalysisType::Kinship => "kinship",
            AnalysisType::Full => "full",
        }
    }

    /// Human readable name
    pub fn label(self) -> &'static str {
        match self {
            AnalysisType::Pca => "PCA",
            AnalysisType::Clustering => "Clustering",
            AnalysisType::Kinship => "Kinship",
            AnalysisType::Full => "Full Analysis",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AnalysisType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pca" => Ok(AnalysisType::Pca),
            "clustering" | "kmeans" => Ok(AnalysisType::Clustering),
            "kinship" => Ok(AnalysisType::Kinship),
            "full" | "full_analysis" => Ok(AnalysisType::Full),
            other => Err(format!("unknown analysis type '{}'", other)),
        }
    }
}
