//! Dataset domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of an uploaded dataset
pub type DatasetId = i64;

/// Uploaded genotype dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: DatasetId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub file_type: String,
    pub file_size_mb: f64,
    #[serde(default)]
    pub n_samples: Option<i64>,
    #[serde(default)]
    pub n_variants: Option<i64>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
