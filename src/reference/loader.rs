//! Loading reference documents into the viewer

use std::path::Path;

use thiserror::Error;
use url::Url;

use super::blob::{Blob, BlobRegistry};
use super::source::ReferenceSource;

pub const ONLINE_HINT: &str = "Online mode: if the viewer stays empty or shows an error, the site \
     blocks embedding. Use a local file instead.";
pub const LOCAL_HINT: &str = "Local mode: the reference was loaded from a local file. \
     This is the best mode for synced scrolling.";

/// Faults raised while assigning a source to the viewer
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("invalid reference URL: {0}")]
    InvalidUrl(String),
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("unknown or revoked object URL: {0}")]
    UnknownBlob(String),
    #[error("remote loading is unavailable")]
    RemoteUnavailable,
}

/// The viewer as seen by the loader
pub trait Viewer {
    /// Point the viewer at a new document
    fn set_source(&mut self, source: &ReferenceSource, blobs: &BlobRegistry) -> Result<(), ViewerError>;
}

/// Reference loader state
pub struct ReferenceLoader {
    /// Contents of the URL input
    pub url_input: String,
    default_url: Option<String>,
    hint: String,
    current: Option<ReferenceSource>,
    blobs: BlobRegistry,
}

impl ReferenceLoader {
    /// Create a loader with an optional default URL
    pub fn new(default_url: Option<String>) -> Self {
        Self {
            url_input: String::new(),
            default_url: default_url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            hint: String::new(),
            current: None,
            blobs: BlobRegistry::new(),
        }
    }

    /// Load the default URL, if one is configured
    pub fn init(&mut self, viewer: &mut dyn Viewer) -> bool {
        match self.default_url.clone() {
            Some(url) => {
                self.url_input = url;
                self.load_from_url(viewer)
            }
            None => false,
        }
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// The source currently assigned to the viewer
    pub fn current(&self) -> Option<&ReferenceSource> {
        self.current.as_ref()
    }

    /// Number of live object URLs
    #[cfg(test)]
    pub fn live_blobs(&self) -> usize {
        self.blobs.len()
    }

    /// Load the URL from the input, falling back to the default URL
    ///
    /// Returns false if nothing was loaded. Faults never propagate.
    pub fn load_from_url(&mut self, viewer: &mut dyn Viewer) -> bool {
        let input = self.url_input.trim();
        let raw = if input.is_empty() {
            match self.default_url.as_deref() {
                Some(url) => url.to_string(),
                None => return false,
            }
        } else {
            input.to_string()
        };

        let loaded = match resolve_url(&raw) {
            Ok(url) => self.assign(ReferenceSource::Remote(url), viewer),
            Err(e) => {
                tracing::warn!("Could not load reference {}: {}", raw, e);
                false
            }
        };

        self.hint = ONLINE_HINT.to_string();
        loaded
    }

    /// Load a file picked from disk through a fresh object URL
    pub fn load_from_local_file(&mut self, path: &Path, viewer: &mut dyn Viewer) -> bool {
        let blob = match Blob::from_path(path) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!("{:#}", e);
                self.hint = format!("Could not read {}: {:#}", path.display(), e);
                return false;
            }
        };

        let url = self.blobs.create_object_url(blob);
        let source = ReferenceSource::LocalFile(url.clone());
        if !self.assign(source, viewer) {
            self.blobs.revoke(&url);
            return false;
        }

        self.hint = LOCAL_HINT.to_string();
        true
    }

    /// Release every object URL
    pub fn shutdown(&mut self) {
        let revoked = self.blobs.revoke_all();
        if revoked > 0 {
            tracing::debug!("Revoked {} object URLs on shutdown", revoked);
        }
    }

    fn assign(&mut self, source: ReferenceSource, viewer: &mut dyn Viewer) -> bool {
        if let Err(e) = viewer.set_source(&source, &self.blobs) {
            tracing::warn!("Viewer rejected {}: {}", source, e);
            return false;
        }

        if let Some(ReferenceSource::LocalFile(previous)) = self.current.replace(source) {
            self.blobs.revoke(&previous);
        }
        true
    }
}

/// Turn user input into a URL
///
/// Existing filesystem paths become `file://` URLs. Input without a scheme
/// whose first segment looks like a host name is tried as `https://`.
pub fn resolve_url(input: &str) -> Result<Url, ViewerError> {
    let path = Path::new(input);
    if path.exists() {
        let absolute = std::fs::canonicalize(path).map_err(|_| ViewerError::InvalidUrl(input.to_string()))?;
        return Url::from_file_path(&absolute).map_err(|_| ViewerError::InvalidUrl(input.to_string()));
    }

    match Url::parse(input) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) if looks_like_host(input) => {
            let guessed = format!("https://{}", input);
            tracing::info!("No scheme in {}, trying {}", input, guessed);
            Url::parse(&guessed).map_err(|e| ViewerError::InvalidUrl(format!("{}: {}", input, e)))
        }
        Err(e) => Err(ViewerError::InvalidUrl(format!("{}: {}", input, e))),
    }
}

fn looks_like_host(input: &str) -> bool {
    let host = input.split(['/', '?', '#']).next().unwrap_or_default();
    !input.chars().any(char::is_whitespace)
        && host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
}
