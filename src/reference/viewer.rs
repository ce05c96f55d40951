//! The embedded reference viewer
//!
//! Holds the loaded document and its scroll state. Navigation completes
//! asynchronously: every navigation ends in exactly one load event, picked up
//! through `poll_load`.

use std::sync::LazyLock;

use regex_lite::Regex;
use tokio::sync::oneshot::{self, error::TryRecvError};

use super::blob::BlobRegistry;
use super::fetch::{FetchError, FetchResult, Fetcher};
use super::loader::{Viewer, ViewerError};
use super::source::{DocumentOrigin, ReferenceSource};
use crate::sync::{DocumentAccess, EmbeddedDocument, ScrollPane};

static HIDDEN_BLOCKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(script|style|head|noscript)\b.*?</(script|style|head|noscript)>").unwrap());
static BLOCK_ENDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(br|/p|/div|/h[1-6]|/li|/tr|/pre|/blockquote)\b[^>]*>").unwrap());
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+").unwrap());

/// What the viewer currently displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerContent {
    /// Nothing loaded, or the load failed or was refused
    Blank,
    /// A remote document is on its way
    Loading,
    /// Rendered as markdown
    Markdown(String),
    /// Shown as plain text
    Text(String),
}

enum Navigation {
    Ready(ViewerContent),
    Fetching(oneshot::Receiver<FetchResult>),
}

/// Reference viewer state
pub struct ReferenceViewer {
    fetcher: Option<Fetcher>,
    source: Option<ReferenceSource>,
    origin: DocumentOrigin,
    content: ViewerContent,
    inflight: Option<oneshot::Receiver<FetchResult>>,
    load_pending: bool,
    pane: ScrollPane,
}

impl ReferenceViewer {
    /// Create an empty viewer. Without a fetcher only local documents load.
    pub fn new(fetcher: Option<Fetcher>) -> Self {
        Self {
            fetcher,
            source: None,
            origin: DocumentOrigin::Local,
            content: ViewerContent::Blank,
            inflight: None,
            load_pending: false,
            pane: ScrollPane::new(),
        }
    }

    pub fn content(&self) -> &ViewerContent {
        &self.content
    }

    pub fn source(&self) -> Option<&ReferenceSource> {
        self.source.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.inflight.is_some()
    }

    /// Scroll state for the widget that renders the document
    pub fn pane_mut(&mut self) -> &mut ScrollPane {
        &mut self.pane
    }

    /// Collect a finished navigation. Returns true if a load event fired.
    pub fn poll_load(&mut self) -> bool {
        if let Some(rx) = self.inflight.as_mut() {
            match rx.try_recv() {
                Ok(result) => {
                    self.inflight = None;
                    self.finish_fetch(result);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => {
                    self.inflight = None;
                    self.finish_fetch(Err(FetchError::Abandoned));
                }
            }
        }

        std::mem::take(&mut self.load_pending)
    }

    fn finish_fetch(&mut self, result: FetchResult) {
        self.content = match result {
            Ok(doc) if doc.embeddable => classify(doc.url.path(), doc.content_type.as_deref(), doc.body),
            Ok(doc) => {
                tracing::info!("{} refuses to be embedded", doc.url);
                ViewerContent::Blank
            }
            Err(_) => ViewerContent::Blank,
        };
        self.pane.reset();
        self.load_pending = true;
    }

    fn navigate(&self, source: &ReferenceSource, blobs: &BlobRegistry) -> Result<Navigation, ViewerError> {
        match source {
            ReferenceSource::LocalFile(url) => {
                let blob = blobs
                    .resolve(url)
                    .ok_or_else(|| ViewerError::UnknownBlob(url.to_string()))?;
                let body = String::from_utf8_lossy(&blob.bytes).into_owned();
                Ok(Navigation::Ready(classify(&blob.name, None, body)))
            }
            ReferenceSource::Remote(url) => match url.scheme() {
                "file" => {
                    let path = url
                        .to_file_path()
                        .map_err(|_| ViewerError::InvalidUrl(url.to_string()))?;
                    let content = match std::fs::read(&path) {
                        Ok(bytes) => {
                            let body = String::from_utf8_lossy(&bytes).into_owned();
                            classify(&path.to_string_lossy(), None, body)
                        }
                        Err(e) => {
                            tracing::warn!("Failed to read {}: {}", path.display(), e);
                            ViewerContent::Blank
                        }
                    };
                    Ok(Navigation::Ready(content))
                }
                "http" | "https" => {
                    let fetcher = self.fetcher.as_ref().ok_or(ViewerError::RemoteUnavailable)?;
                    Ok(Navigation::Fetching(fetcher.spawn(url.clone())))
                }
                other => Err(ViewerError::UnsupportedScheme(other.to_string())),
            },
        }
    }
}

impl Viewer for ReferenceViewer {
    fn set_source(&mut self, source: &ReferenceSource, blobs: &BlobRegistry) -> Result<(), ViewerError> {
        let navigation = self.navigate(source, blobs)?;

        self.source = Some(source.clone());
        self.origin = source.origin();
        tracing::info!("Viewer navigating to {} (origin: {})", source, self.origin);
        self.pane.reset();

        match navigation {
            Navigation::Ready(content) => {
                // Dropping the receiver abandons any fetch still running
                self.inflight = None;
                self.content = content;
                self.load_pending = true;
            }
            Navigation::Fetching(rx) => {
                self.inflight = Some(rx);
                self.content = ViewerContent::Loading;
                self.load_pending = false;
            }
        }
        Ok(())
    }
}

impl EmbeddedDocument for ReferenceViewer {
    fn probe(&mut self) -> DocumentAccess<'_> {
        if self.origin.is_same_origin() {
            DocumentAccess::Accessible(&mut self.pane)
        } else {
            DocumentAccess::Blocked
        }
    }
}

/// Pick a presentation from the content type or file name
fn classify(name: &str, content_type: Option<&str>, body: String) -> ViewerContent {
    let name = name.to_lowercase();
    let content_type = content_type.unwrap_or_default().to_lowercase();

    if content_type.contains("markdown") || name.ends_with(".md") || name.ends_with(".markdown") {
        ViewerContent::Markdown(body)
    } else if content_type.contains("html") || name.ends_with(".html") || name.ends_with(".htm") {
        ViewerContent::Text(html_to_text(&body))
    } else {
        ViewerContent::Text(body)
    }
}

/// Reduce an HTML page to readable text
fn html_to_text(html: &str) -> String {
    let text = HIDDEN_BLOCKS.replace_all(html, "");
    let text = BLOCK_ENDS.replace_all(&text, "\n");
    let text = TAGS.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    BLANK_RUNS.replace_all(text.trim(), "\n\n").into_owned()
}
