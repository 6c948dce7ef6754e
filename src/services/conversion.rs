//! PDF.co conversion service client.
//!
//! Conversion runs as an asynchronous job on PDF.co: a submission returns a
//! job id plus the URL where the text will appear, the job is then polled
//! through `/job/check` until it settles, and the finished text is fetched
//! from the returned URL.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const API_TIMEOUT: Duration = Duration::from_secs(30);
const RESULT_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_SUBMIT_ERROR: &str = "PDF.co create job failed";

/// Status reported by a job check.
#[derive(Debug, Clone, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ConversionStatus {
    Working,
    Success,
    Failed,
    Aborted,
    #[strum(default)]
    Other(String),
}

impl ConversionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ConversionStatus::Working => "working",
            ConversionStatus::Success => "success",
            ConversionStatus::Failed => "failed",
            ConversionStatus::Aborted => "aborted",
            ConversionStatus::Other(status) => status,
        }
    }
}

/// What the service answered to a submission.
///
/// The fields stay optional here; the submitter decides whether a receipt
/// without a job id or result URL is usable.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub job_id: Option<String>,
    #[serde(rename = "url")]
    pub result_url: Option<String>,
}

/// Remote asynchronous conversion service.
#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Create an async conversion job for the PDF at `source_url`.
    async fn submit(&self, source_url: &str) -> Result<SubmissionReceipt, ConversionError>;

    /// Check the status of a previously submitted job.
    async fn check_status(&self, job_id: &str) -> Result<ConversionStatus, ConversionError>;

    /// Download the converted text from a result locator.
    async fn fetch_result(&self, result_url: &str) -> Result<String, ConversionError>;
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    error: bool,
    message: Option<String>,
    #[serde(flatten)]
    receipt: SubmissionReceipt,
}

#[derive(Deserialize)]
struct JobCheckResponse {
    status: Option<String>,
}

/// Client for the PDF.co REST API.
pub struct PdfCoClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl PdfCoClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ConversionError> {
        let http = Client::builder().timeout(API_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl ConversionService for PdfCoClient {
    async fn submit(&self, source_url: &str) -> Result<SubmissionReceipt, ConversionError> {
        let url = format!("{}/pdf/convert/to/text", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({ "url": source_url, "async": true }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<SubmitResponse>(&body) {
            Ok(parsed) if !status.is_success() || parsed.error => Err(ConversionError::Rejected(
                parsed
                    .message
                    .unwrap_or_else(|| DEFAULT_SUBMIT_ERROR.to_string()),
            )),
            Ok(parsed) => Ok(parsed.receipt),
            Err(_) if !status.is_success() => Err(ConversionError::Rejected(format!(
                "{DEFAULT_SUBMIT_ERROR}: {status}"
            ))),
            Err(e) => Err(ConversionError::Parse(e)),
        }
    }

    async fn check_status(&self, job_id: &str) -> Result<ConversionStatus, ConversionError> {
        let url = format!("{}/job/check", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({ "jobid": job_id }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ConversionError::Status {
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        let check: JobCheckResponse = serde_json::from_str(&response.text().await?)?;
        let raw = check.status.unwrap_or_default();

        // `Other` is the strum default variant, so parsing never fails.
        Ok(ConversionStatus::from_str(&raw).unwrap_or(ConversionStatus::Other(raw)))
    }

    async fn fetch_result(&self, result_url: &str) -> Result<String, ConversionError> {
        let response = self
            .http
            .get(result_url)
            .timeout(RESULT_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConversionError::ResultUnavailable(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("HTTP request to PDF.co failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse PDF.co response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("PDF.co job check failed: {status} {body}")]
    Status { status: u16, body: String },

    #[error("Failed to fetch result file: {0}")]
    ResultUnavailable(u16),
}
