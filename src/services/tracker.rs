//! Per-job tracker: polls a conversion job until it settles and records the
//! outcome on the document.
//!
//! Every tracker issues exactly two document writes: a visibility write
//! marking the document `working` before the first status check, and one
//! terminal write (`success` with content, or `failed` with a reason). The
//! embedder is only triggered after a successful `success` write.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::models::document::DocumentUpdate;
use crate::models::job::{ExtractionJob, FailureReason, JobOutcome, JobStatus};
use crate::services::conversion::{ConversionService, ConversionStatus};
use crate::services::document_store::DocumentStore;
use crate::services::notifier::Notifier;

/// Wait schedule between status checks.
///
/// A fixed interval bounded by a wall-clock budget measured from job start.
/// The deadline is checked before every status check, so no more than
/// `max_checks()` billable checks are issued per job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_wait: Duration::from_secs(1800),
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    /// Upper bound on status checks one job can issue.
    pub fn max_checks(&self) -> u64 {
        let interval = self.interval.as_millis().max(1);
        self.max_wait.as_millis().div_ceil(interval) as u64
    }
}

pub struct Tracker {
    conversion: Arc<dyn ConversionService>,
    store: Arc<dyn DocumentStore>,
    notifier: Arc<dyn Notifier>,
    policy: PollPolicy,
}

impl Tracker {
    pub fn new(
        conversion: Arc<dyn ConversionService>,
        store: Arc<dyn DocumentStore>,
        notifier: Arc<dyn Notifier>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            conversion,
            store,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Track `job` on a detached task. No handle is returned; the task ends
    /// on its own once the job is resolved or its deadline passes.
    pub fn spawn(self: &Arc<Self>, job: ExtractionJob) {
        let tracker = Arc::clone(self);
        tokio::spawn(async move {
            tracker.run(job).await;
        });
    }

    /// Drive one job to a terminal state and persist the result.
    #[tracing::instrument(
        skip(self, job),
        fields(doc_id = %job.document_id, job_id = %job.job_id)
    )]
    pub async fn run(&self, mut job: ExtractionJob) -> JobOutcome {
        metrics::gauge!("extraction_jobs_in_flight").increment(1.0);
        info!("Start polling conversion job");

        if let Err(e) = self
            .store
            .update(&job.document_id, &DocumentUpdate::working(&job.job_id))
            .await
        {
            warn!(error = %e, "Failed to mark document as working, continuing");
        }

        let mut status_checks = 0;
        let extracted = match self.poll(&mut job, &mut status_checks).await {
            Ok(()) => self.retrieve(&mut job).await,
            Err(reason) => Err(reason),
        };

        debug_assert!(job.status.is_terminal());
        let outcome = match extracted {
            Ok(text) => self.finish_success(&job, text, status_checks).await,
            Err(reason) => self.finish_failure(&job, reason, status_checks).await,
        };

        metrics::gauge!("extraction_jobs_in_flight").decrement(1.0);
        metrics::histogram!("extraction_job_duration_seconds")
            .record(job.started_at.elapsed().as_secs_f64());

        outcome
    }

    /// Poll until the job settles. A check that errors is logged and skipped.
    async fn poll(
        &self,
        job: &mut ExtractionJob,
        status_checks: &mut u32,
    ) -> Result<(), FailureReason> {
        loop {
            if job.started_at.elapsed() >= self.policy.max_wait {
                job.status = JobStatus::TimedOut;
                return Err(FailureReason::TimedOut(self.policy.max_wait.as_secs()));
            }

            *status_checks += 1;
            metrics::counter!("extraction_status_checks_total").increment(1);

            match self.conversion.check_status(&job.job_id).await {
                Ok(ConversionStatus::Success) => {
                    job.status = JobStatus::Success;
                    info!(status_checks = *status_checks, "Conversion job succeeded");
                    return Ok(());
                }
                Ok(status @ (ConversionStatus::Failed | ConversionStatus::Aborted)) => {
                    job.status = if status == ConversionStatus::Aborted {
                        JobStatus::Aborted
                    } else {
                        JobStatus::Failed
                    };
                    warn!(status = status.as_str(), "Conversion job did not succeed");
                    return Err(FailureReason::ConversionStatus(status.as_str().to_string()));
                }
                Ok(status) => {
                    job.status = JobStatus::Working;
                    debug!(status = status.as_str(), attempt = *status_checks, "Job still running");
                }
                Err(e) => {
                    warn!(error = %e, attempt = *status_checks, "Job check failed, will retry");
                }
            }

            sleep(self.policy.interval).await;
        }
    }

    /// Single download attempt of the finished text.
    async fn retrieve(&self, job: &mut ExtractionJob) -> Result<String, FailureReason> {
        let text = match self.conversion.fetch_result(&job.result_locator).await {
            Ok(text) => text,
            Err(e) => {
                job.status = JobStatus::Failed;
                return Err(FailureReason::FetchResultFailed(e.to_string()));
            }
        };

        // A successful job with no text usually means a scanned PDF.
        if text.trim().is_empty() {
            job.status = JobStatus::Failed;
            return Err(FailureReason::ExtractedTextEmpty);
        }

        Ok(text)
    }

    async fn finish_success(
        &self,
        job: &ExtractionJob,
        text: String,
        status_checks: u32,
    ) -> JobOutcome {
        let chars = text.chars().count();

        let persisted = match self
            .store
            .update(&job.document_id, &DocumentUpdate::succeeded(text))
            .await
        {
            Ok(()) => {
                info!(chars, "Extracted text stored");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to store extracted text, document left stale");
                metrics::counter!("extraction_store_writes_failed_total", "outcome" => "success")
                    .increment(1);
                false
            }
        };

        if persisted {
            metrics::counter!("extraction_jobs_completed_total").increment(1);
            match self.notifier.notify().await {
                Ok(()) => info!("Embedder triggered"),
                Err(e) => warn!(error = %e, "Embedder trigger failed"),
            }
        }

        JobOutcome {
            status: job.status,
            failure: None,
            status_checks,
            persisted,
        }
    }

    async fn finish_failure(
        &self,
        job: &ExtractionJob,
        reason: FailureReason,
        status_checks: u32,
    ) -> JobOutcome {
        warn!(reason = %reason, status = %job.status, "Extraction failed");

        let persisted = match self
            .store
            .update(&job.document_id, &DocumentUpdate::failed(reason.to_string()))
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to record extraction failure, document left stale");
                metrics::counter!("extraction_store_writes_failed_total", "outcome" => "failed")
                    .increment(1);
                false
            }
        };

        metrics::counter!("extraction_jobs_failed_total", "reason" => reason.kind()).increment(1);

        JobOutcome {
            status: job.status,
            failure: Some(reason),
            status_checks,
            persisted,
        }
    }
}
