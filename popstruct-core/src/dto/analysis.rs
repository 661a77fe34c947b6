//! Analysis submission DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::dataset::DatasetId;

/// Body of `POST /analysis/{type}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAnalysis {
    pub name: String,
    pub dataset_id: DatasetId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, Value>>,
}

impl CreateAnalysis {
    pub fn new(name: impl Into<String>, dataset_id: DatasetId) -> Self {
        Self {
            name: name.into(),
            dataset_id,
            parameters: None,
        }
    }

    /// Sets one analysis parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value);
        self
    }
}

/// Parses a `key=value` parameter
///
/// Values that read as JSON scalars (`10`, `0.5`, `true`) keep their type,
/// anything else is sent as a string.
pub fn parse_parameter(input: &str) -> Result<(String, Value), String> {
    let (key, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", input))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(format!("parameter name missing in '{}'", input));
    }

    let raw = raw.trim();
    let value = match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Bool(_) | Value::Number(_) | Value::Null)) => v,
        _ => Value::String(raw.to_string()),
    };

    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_parameter_types() {
        assert_eq!(
            parse_parameter("n_components=10").unwrap(),
            ("n_components".to_string(), json!(10))
        );
        assert_eq!(
            parse_parameter("normalize=true").unwrap(),
            ("normalize".to_string(), json!(true))
        );
        assert_eq!(
            parse_parameter("method = ibs").unwrap(),
            ("method".to_string(), json!("ibs"))
        );
        assert_eq!(
            parse_parameter("labels=[1,2]").unwrap(),
            ("labels".to_string(), json!("[1,2]"))
        );
    }

    #[test]
    fn test_parse_parameter_rejects_malformed() {
        assert!(parse_parameter("n_components").is_err());
        assert!(parse_parameter("=3").is_err());
    }

    #[test]
    fn test_request_body() {
        let req = CreateAnalysis::new("Full Analysis - cohort", 7)
            .with_parameter("n_components", json!(10))
            .with_parameter("n_clusters", json!(3));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "name": "Full Analysis - cohort",
                "dataset_id": 7,
                "parameters": { "n_clusters": 3, "n_components": 10 }
            })
        );

        let bare = CreateAnalysis::new("pca", 7);
        assert!(serde_json::to_value(&bare).unwrap().get("parameters").is_none());
    }
}
