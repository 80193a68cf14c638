use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a record filter request. Both fields stay loosely typed so that
/// missing, falsy and malformed values can be told apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub now: Option<Value>,
    #[serde(default, rename = "resultList")]
    pub result_list: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResponse {
    pub valid_results: Vec<Value>,
    #[serde(rename = "fileSize")]
    pub file_size: usize,
}
