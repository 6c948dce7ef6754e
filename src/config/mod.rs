use std::time::Duration;

use garde::Validate;
use serde::Deserialize;

use crate::services::tracker::PollPolicy;

#[derive(Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Port the HTTP server listens on
    #[garde(skip)]
    pub port: u16,

    /// PDF.co API key
    #[garde(length(min = 1))]
    pub pdf_co_api_key: String,

    /// PDF.co API base URL
    #[serde(default = "default_pdf_co_base_url")]
    #[garde(length(min = 1))]
    pub pdf_co_base_url: String,

    /// Supabase project URL
    #[garde(length(min = 1))]
    pub supabase_url: String,

    /// Supabase service role key (used as both `apikey` and bearer token)
    #[garde(length(min = 1))]
    pub supabase_service_role_key: String,

    /// Table holding document records
    #[serde(default = "default_document_table")]
    #[garde(length(min = 1))]
    pub document_table: String,

    /// Primary key column of the document table
    #[serde(default = "default_document_id_column")]
    #[garde(length(min = 1))]
    pub document_id_column: String,

    /// Endpoint triggered after new content is stored
    #[serde(default = "default_embedder_url")]
    #[garde(length(min = 1))]
    pub embedder_url: String,

    /// Seconds between job status checks
    #[serde(default = "default_poll_interval_secs")]
    #[garde(range(min = 1))]
    pub poll_interval_secs: u64,

    /// Wall-clock budget per job, in seconds
    #[serde(default = "default_max_wait_secs")]
    #[garde(range(min = 1))]
    pub max_wait_secs: u64,
}

fn default_pdf_co_base_url() -> String {
    "https://api.pdf.co/v1".to_string()
}

fn default_document_table() -> String {
    "HOADocuments".to_string()
}

fn default_document_id_column() -> String {
    "HOADocumentID".to_string()
}

fn default_embedder_url() -> String {
    "https://embedder-document.onrender.com/embed".to_string()
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_max_wait_secs() -> u64 {
    1800
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::checked(envy::from_env()?)
    }

    /// Build from explicit `(NAME, value)` pairs instead of the process
    /// environment.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::checked(envy::from_iter(vars)?)
    }

    fn checked(config: Self) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.poll_interval_secs),
            Duration::from_secs(self.max_wait_secs),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read environment: {0}")]
    Env(#[from] envy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] garde::Report),
}
