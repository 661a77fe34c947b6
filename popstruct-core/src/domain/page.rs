//! Paginated listings

use serde::{Deserialize, Serialize};

use crate::domain::dataset::{Dataset, DatasetId};
use crate::domain::job::Job;

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

/// One page of the current user's jobs, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl JobPage {
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.page_size)
    }
}

/// One page of the current user's datasets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPage {
    pub datasets: Vec<Dataset>,
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl DatasetPage {
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.page_size)
    }

    /// Identifiers listed on this page, in display order
    pub fn ids(&self) -> Vec<DatasetId> {
        self.datasets.iter().map(|d| d.id).collect()
    }

    pub fn contains(&self, id: DatasetId) -> bool {
        self.datasets.iter().any(|d| d.id == id)
    }
}

fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 || total == 0 {
        return 1;
    }
    total.div_ceil(u64::from(page_size)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_total_pages_rounds_up() {
        let page: JobPage = serde_json::from_value(json!({
            "jobs": [],
            "total": 21,
            "page": 1,
            "page_size": 10
        }))
        .unwrap();
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let page: DatasetPage =
            serde_json::from_value(json!({ "datasets": [], "total": 0 })).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 20);
        assert_eq!(page.total_pages(), 1);
        assert!(page.ids().is_empty());
    }
}
