//! PDF download.
//!
//! A single GET with the client's default redirect policy. The response
//! body is kept in memory; pdfium loads documents straight from a byte
//! slice so no temp file is needed.

use crate::error::QuestionsError;
use crate::output::PdfBytes;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Retrieves PDF bytes for a URL.
#[async_trait]
pub trait PdfFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PdfBytes, QuestionsError>;
}

/// `reqwest`-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher, optionally bounding the whole request.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, QuestionsError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| QuestionsError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PdfFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<PdfBytes, QuestionsError> {
        validate_url(url)?;
        info!("Downloading PDF from: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            QuestionsError::DownloadFailed {
                url: url.to_string(),
                status: e.status().map(|s| s.as_u16()),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuestionsError::DownloadFailed {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: format!("HTTP {}", status),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| QuestionsError::DownloadFailed {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: e.to_string(),
            })?;

        debug!("Downloaded {} bytes", bytes.len());
        Ok(PdfBytes::new(bytes.to_vec()))
    }
}

/// Check the source is a non-empty http(s) URL.
pub fn validate_url(url: &str) -> Result<(), QuestionsError> {
    let invalid = |reason: &str| QuestionsError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if url.trim().is_empty() {
        return Err(invalid("URL is empty"));
    }
    let parsed = reqwest::Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(&format!("unsupported scheme '{other}'"))),
    }
}
