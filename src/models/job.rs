use tokio::time::Instant;

/// Lifecycle of an extraction job while its tracker is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Working,
    Success,
    Failed,
    Aborted,
    TimedOut,
}

impl JobStatus {
    /// A terminal status takes no further polling action.
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending | JobStatus::Working)
    }
}

/// An in-flight conversion job, owned by exactly one tracker.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    pub document_id: String,
    pub job_id: String,
    pub result_locator: String,
    pub status: JobStatus,
    pub started_at: Instant,
}

impl ExtractionJob {
    pub fn new(document_id: String, job_id: String, result_locator: String) -> Self {
        Self {
            document_id,
            job_id,
            result_locator,
            status: JobStatus::Pending,
            started_at: Instant::now(),
        }
    }
}

/// Why a job ended in `extraction_status = failed`.
///
/// The `Display` output is the exact reason string persisted to the
/// document record, so operators can tell causes apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureReason {
    #[error("conversion_status_{0}")]
    ConversionStatus(String),

    #[error("timeout_after_{0}s")]
    TimedOut(u64),

    #[error("fetch_result_failed: {0}")]
    FetchResultFailed(String),

    #[error("extracted_text_empty")]
    ExtractedTextEmpty,
}

impl FailureReason {
    /// Low-cardinality label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FailureReason::ConversionStatus(_) => "conversion_status",
            FailureReason::TimedOut(_) => "timed_out",
            FailureReason::FetchResultFailed(_) => "fetch_result_failed",
            FailureReason::ExtractedTextEmpty => "extracted_text_empty",
        }
    }
}

/// Final result of one tracker run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub status: JobStatus,
    pub failure: Option<FailureReason>,
    pub status_checks: u32,
    /// Whether the terminal document update was accepted by the store.
    pub persisted: bool,
}
