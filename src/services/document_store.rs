use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::models::document::DocumentUpdate;

/// System of record for extracted documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Apply a partial update to the record keyed by `doc_id`.
    async fn update(&self, doc_id: &str, update: &DocumentUpdate) -> Result<(), DocumentStoreError>;
}

/// Document table exposed through Supabase's PostgREST API.
pub struct SupabaseDocumentStore {
    http: Client,
    endpoint: String,
    id_column: String,
    service_key: String,
}

impl SupabaseDocumentStore {
    pub fn new(
        base_url: &str,
        service_key: &str,
        table: &str,
        id_column: &str,
    ) -> Result<Self, DocumentStoreError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            id_column: id_column.to_string(),
            service_key: service_key.to_string(),
        })
    }
}

#[async_trait]
impl DocumentStore for SupabaseDocumentStore {
    async fn update(&self, doc_id: &str, update: &DocumentUpdate) -> Result<(), DocumentStoreError> {
        let response = self
            .http
            .patch(&self.endpoint)
            .query(&[(self.id_column.as_str(), format!("eq.{doc_id}"))])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(update)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocumentStoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    #[error("HTTP request to document store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document store rejected update: {status} {body}")]
    Rejected { status: u16, body: String },
}
