use std::sync::Arc;

use tracing::{info, warn};

use crate::models::extraction::ExtractTextResponse;
use crate::models::job::ExtractionJob;
use crate::services::conversion::{ConversionError, ConversionService};
use crate::services::tracker::Tracker;

/// Creates conversion jobs and hands them to a detached tracker.
pub struct Submitter {
    conversion: Arc<dyn ConversionService>,
    tracker: Arc<Tracker>,
}

impl Submitter {
    pub fn new(conversion: Arc<dyn ConversionService>, tracker: Arc<Tracker>) -> Self {
        Self {
            conversion,
            tracker,
        }
    }

    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    /// Submit `source_url` for conversion on behalf of `doc_id`.
    ///
    /// Returns as soon as the tracker task is spawned; nothing is written to
    /// the document when submission fails.
    pub async fn submit(
        &self,
        doc_id: &str,
        source_url: &str,
    ) -> Result<ExtractTextResponse, SubmitError> {
        let receipt = self.conversion.submit(source_url).await.map_err(|e| {
            warn!(doc_id, error = %e, "Conversion job submission failed");
            match e {
                ConversionError::Rejected(message) => SubmitError::Rejected(message),
                other => SubmitError::Unavailable(other),
            }
        })?;

        let (job_id, result_url) = match (receipt.job_id, receipt.result_url) {
            (Some(job_id), Some(result_url)) if !job_id.is_empty() && !result_url.is_empty() => {
                (job_id, result_url)
            }
            _ => {
                warn!(doc_id, "Conversion service response lacks jobId or url");
                return Err(SubmitError::IncompleteReceipt);
            }
        };

        info!(doc_id, job_id = %job_id, "Conversion job created");

        self.tracker
            .spawn(ExtractionJob::new(doc_id.to_string(), job_id.clone(), result_url));

        Ok(ExtractTextResponse::started(doc_id.to_string(), job_id))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The conversion service refused the job; carries its message.
    #[error("{0}")]
    Rejected(String),

    #[error("PDF.co did not return jobId/url")]
    IncompleteReceipt,

    #[error(transparent)]
    Unavailable(ConversionError),
}

impl SubmitError {
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Rejected(_) => "rejected",
            SubmitError::IncompleteReceipt => "incomplete_receipt",
            SubmitError::Unavailable(_) => "unavailable",
        }
    }
}
