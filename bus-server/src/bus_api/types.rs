//! Provider response envelope.
//!
//! The provider sends everything as strings (`"gpsX": "127.1061"`) except a
//! few integer fields, and omits or nulls `resultList` when nothing matched.

use serde::{Deserialize, Serialize};

/// The `errorCode` the provider uses for success.
pub const SUCCESS_CODE: &str = "0000";

/// The `errorCode` for "no matching results", which is not a failure.
pub const NO_RESULT_CODE: &str = "4";

/// One untyped record from `resultList`.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Status block of every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamStatus {
    #[serde(rename = "errorCode")]
    pub code: String,
    #[serde(rename = "errorMessage", default)]
    pub message: String,
}

impl UpstreamStatus {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE || self.code == NO_RESULT_CODE
    }
}

/// A full provider response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub error: Option<UpstreamStatus>,

    #[serde(rename = "resultList", default)]
    pub result_list: Option<Vec<RawRecord>>,
}

impl RawResponse {
    /// Build a successful response around `records`.
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        Self {
            error: Some(UpstreamStatus {
                code: SUCCESS_CODE.to_string(),
                message: "성공".to_string(),
            }),
            result_list: Some(records),
        }
    }

    /// The records, treating a null or missing list as empty.
    pub fn records(&self) -> &[RawRecord] {
        self.result_list.as_deref().unwrap_or_default()
    }
}
