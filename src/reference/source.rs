//! Reference sources and the origins they load into

use std::fmt;

use url::Url;

/// Revocable address of an in-memory local file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobUrl(String);

impl BlobUrl {
    pub(crate) fn new(id: u64) -> Self {
        Self(format!("blob:refnotes/{}", id))
    }
}

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The document shown in the reference viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    /// A URL typed by the user or configured as the default
    Remote(Url),
    /// A file picked from disk, held behind an object URL
    LocalFile(BlobUrl),
}

impl ReferenceSource {
    /// Origin of the document this source produces
    pub fn origin(&self) -> DocumentOrigin {
        match self {
            ReferenceSource::LocalFile(_) => DocumentOrigin::Local,
            ReferenceSource::Remote(url) if url.scheme() == "file" => DocumentOrigin::Local,
            ReferenceSource::Remote(url) => DocumentOrigin::Remote(url.origin().ascii_serialization()),
        }
    }

    /// The remote URL, if this is one that can be opened elsewhere
    pub fn remote_url(&self) -> Option<&Url> {
        match self {
            ReferenceSource::Remote(url) => Some(url),
            ReferenceSource::LocalFile(_) => None,
        }
    }
}

impl fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceSource::Remote(url) => write!(f, "{}", url),
            ReferenceSource::LocalFile(blob) => write!(f, "{}", blob),
        }
    }
}

/// Where a loaded document comes from, relative to the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOrigin {
    /// Same origin as the application: local files and `file://` URLs
    Local,
    /// Any network origin, serialized as `scheme://host[:port]`
    Remote(String),
}

impl DocumentOrigin {
    pub fn is_same_origin(&self) -> bool {
        matches!(self, DocumentOrigin::Local)
    }
}

impl fmt::Display for DocumentOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentOrigin::Local => f.write_str("local"),
            DocumentOrigin::Remote(origin) => f.write_str(origin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origins() {
        let local = ReferenceSource::LocalFile(BlobUrl::new(3));
        assert_eq!(local.origin(), DocumentOrigin::Local);
        assert_eq!(local.to_string(), "blob:refnotes/3");

        let file = ReferenceSource::Remote(Url::parse("file:///tmp/ref.md").unwrap());
        assert!(file.origin().is_same_origin());

        let web = ReferenceSource::Remote(Url::parse("https://example.com:8443/a/b?c").unwrap());
        assert_eq!(
            web.origin(),
            DocumentOrigin::Remote("https://example.com:8443".to_string())
        );
        assert!(!web.origin().is_same_origin());
        assert_eq!(web.origin().to_string(), "https://example.com:8443");
        assert_eq!(local.origin().to_string(), "local");
        assert!(web.remote_url().is_some());
    }
}
