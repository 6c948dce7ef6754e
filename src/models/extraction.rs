use garde::Validate;
use serde::{Deserialize, Serialize};

/// Body of `POST /extract-text`.
///
/// Missing fields deserialize to empty strings so that absence and
/// emptiness are rejected by the same validation rule.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTextRequest {
    #[serde(default)]
    #[garde(length(min = 1))]
    pub pdf_url: String,

    #[serde(default)]
    #[garde(length(min = 1))]
    pub doc_id: String,
}

/// Acknowledgment returned once a tracker has been handed the job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExtractTextResponse {
    pub doc_id: String,
    pub job_id: String,
    pub status: String,
}

impl ExtractTextResponse {
    pub fn started(doc_id: String, job_id: String) -> Self {
        Self {
            doc_id,
            job_id,
            status: "started".to_string(),
        }
    }
}

/// Error body for rejected submissions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
