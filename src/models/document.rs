use serde::{Deserialize, Serialize};

/// `extraction_status` column of a document record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Working,
    Success,
    Failed,
}

/// Partial update of a document record.
///
/// Absent fields are left out of the PATCH body entirely. `extraction_error`
/// is doubly optional: `Some(None)` serializes as an explicit JSON `null`,
/// which clears a stale error on the record.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_status: Option<ExtractionStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdfco_job_id: Option<String>,
}

impl DocumentUpdate {
    /// Visibility write issued when a tracker starts.
    pub fn working(job_id: &str) -> Self {
        Self {
            extraction_status: Some(ExtractionStatus::Working),
            extraction_error: Some(None),
            pdfco_job_id: Some(job_id.to_string()),
            ..Default::default()
        }
    }

    /// Terminal write for a job whose text was retrieved.
    pub fn succeeded(content: String) -> Self {
        Self {
            extraction_status: Some(ExtractionStatus::Success),
            extraction_error: Some(None),
            content: Some(content),
            ..Default::default()
        }
    }

    /// Terminal write for any failure or timeout.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            extraction_status: Some(ExtractionStatus::Failed),
            extraction_error: Some(Some(reason.into())),
            ..Default::default()
        }
    }
}
