//! Network and local-file retrieval.

use crate::error::FetchError;
use crate::fetcher::{normalize_text, Fetcher};
use async_trait::async_trait;
use solfetch_source::RetrievalKey;
use std::time::Duration;
use tracing::debug;

/// Fetches `http`/`https` keys with a GET request and `file` keys from disk.
///
/// Any 2xx response is a success. There is no retry and no authentication.
#[derive(Clone)]
pub struct UrlFetcher {
    client: reqwest::Client,
}

impl UrlFetcher {
    /// Creates a fetcher without a request timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(None)
    }

    /// Creates a fetcher whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("solfetch/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    async fn fetch_http(&self, key: &RetrievalKey) -> Result<String, FetchError> {
        let response = self
            .client
            .get(key.as_url().clone())
            .send()
            .await
            .map_err(|e| transport_error(key, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(|e| transport_error(key, e))?;
        debug!(%key, bytes = text.len(), "fetched over http");
        Ok(text)
    }
}

#[async_trait]
impl Fetcher for UrlFetcher {
    async fn fetch(&self, key: &RetrievalKey) -> Result<String, FetchError> {
        let text = match key.scheme() {
            "http" | "https" => self.fetch_http(key).await?,
            "file" => fetch_file(key).await?,
            other => {
                return Err(FetchError::UnsupportedScheme {
                    key: key.to_string(),
                    scheme: other.to_string(),
                })
            }
        };
        Ok(normalize_text(text))
    }
}

async fn fetch_file(key: &RetrievalKey) -> Result<String, FetchError> {
    let path = key.as_url().to_file_path().map_err(|()| FetchError::Io {
        key: key.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "location is not a local file path",
        ),
    })?;
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| FetchError::Io {
            key: key.to_string(),
            source,
        })?;
    debug!(%key, bytes = text.len(), "read local file");
    Ok(text)
}

fn transport_error(key: &RetrievalKey, err: reqwest::Error) -> FetchError {
    FetchError::Transport {
        key: key.to_string(),
        reason: err.to_string(),
    }
}
