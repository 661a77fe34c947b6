//! Job listing DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::JobStatus;

/// Query for `GET /jobs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(rename = "status_filter", skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

impl JobQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            status: None,
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl Default for JobQuery {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_omits_missing_filter() {
        let query = JobQuery::new(2, 10);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({ "page": 2, "page_size": 10 })
        );
    }

    #[test]
    fn test_query_status_filter() {
        let query = JobQuery::new(1, 10).with_status(JobStatus::Running);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({ "page": 1, "page_size": 10, "status_filter": "running" })
        );
    }
}
