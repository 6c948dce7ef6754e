use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

/// Downstream process told that fresh content has been stored.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self) -> Result<(), NotifierError>;
}

/// Triggers the embedding service so it re-embeds new document content.
pub struct EmbedderNotifier {
    http: Client,
    url: String,
}

impl EmbedderNotifier {
    pub fn new(url: &str) -> Result<Self, NotifierError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for EmbedderNotifier {
    async fn notify(&self) -> Result<(), NotifierError> {
        let response = self.http.post(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifierError::Rejected {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("HTTP request to embedder failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedder returned {status}: {body}")]
    Rejected { status: u16, body: String },
}
