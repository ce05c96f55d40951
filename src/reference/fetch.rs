//! Background fetching of remote reference documents

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderName, CONTENT_SECURITY_POLICY, CONTENT_TYPE, X_FRAME_OPTIONS};
use thiserror::Error;
use tokio::sync::oneshot;
use url::Url;

use super::policy::allows_embedding;

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// A fetched remote document
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Final URL after redirects
    pub url: Url,
    /// Declared content type
    pub content_type: Option<String>,
    /// Response body as text
    pub body: String,
    /// Whether the response allows being shown in the viewer
    pub embeddable: bool,
}

/// Failure fetching a remote document
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server responded with {0}")]
    Status(reqwest::StatusCode),
    #[error("fetch was abandoned")]
    Abandoned,
}

pub type FetchResult = Result<FetchedDocument, FetchError>;

/// Runs HTTP requests off the UI thread
pub struct Fetcher {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
}

impl Fetcher {
    /// Start a small runtime for fetches
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("refnotes-fetch")
            .enable_all()
            .build()
            .context("Failed to start fetch runtime")?;

        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { runtime, client })
    }

    /// Fetch `url` in the background; the result arrives on the receiver
    pub fn spawn(&self, url: Url) -> oneshot::Receiver<FetchResult> {
        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();

        self.runtime.spawn(async move {
            let result = fetch_document(&client, url.clone()).await;
            if let Err(e) = &result {
                tracing::warn!("Failed to fetch {}: {}", url, e);
            }
            // The viewer may have moved on; a closed receiver is fine
            let _ = tx.send(result);
        });

        rx
    }
}

async fn fetch_document(client: &reqwest::Client, url: Url) -> FetchResult {
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let headers = response.headers();
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let content_type = header(CONTENT_TYPE);
    let embeddable = allows_embedding(
        header(X_FRAME_OPTIONS).as_deref(),
        header(CONTENT_SECURITY_POLICY).as_deref(),
    );
    let url = response.url().clone();

    let body = response.text().await?;

    Ok(FetchedDocument {
        url,
        content_type,
        body,
        embeddable,
    })
}
