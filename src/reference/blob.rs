//! Object URLs for locally picked files

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use super::source::BlobUrl;

/// File contents held in memory behind an object URL
#[derive(Debug, Clone)]
pub struct Blob {
    /// File name shown to the user
    pub name: String,
    /// Original location on disk
    pub path: PathBuf,
    /// Raw bytes
    pub bytes: Arc<[u8]>,
}

impl Blob {
    /// Read a file into a blob
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());

        Ok(Self {
            name,
            path: path.to_path_buf(),
            bytes: bytes.into(),
        })
    }
}

/// Registry of live object URLs
#[derive(Debug, Default)]
pub struct BlobRegistry {
    blobs: HashMap<BlobUrl, Blob>,
    next_id: u64,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob and hand out a fresh URL for it
    pub fn create_object_url(&mut self, blob: Blob) -> BlobUrl {
        self.next_id += 1;
        let url = BlobUrl::new(self.next_id);
        tracing::debug!("Created {} for {}", url, blob.path.display());
        self.blobs.insert(url.clone(), blob);
        url
    }

    /// Release a URL. Returns whether it was live.
    pub fn revoke(&mut self, url: &BlobUrl) -> bool {
        let revoked = self.blobs.remove(url).is_some();
        if revoked {
            tracing::debug!("Revoked {}", url);
        }
        revoked
    }

    /// Release every URL. Returns how many were live.
    pub fn revoke_all(&mut self) -> usize {
        let count = self.blobs.len();
        self.blobs.clear();
        count
    }

    /// Look up a live URL
    pub fn resolve(&self, url: &BlobUrl) -> Option<&Blob> {
        self.blobs.get(url)
    }

    /// Number of live URLs
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(name: &str) -> Blob {
        Blob {
            name: name.to_string(),
            path: PathBuf::from(name),
            bytes: Arc::from(&b"content"[..]),
        }
    }

    #[test]
    fn test_urls_are_unique_and_revocable() {
        let mut registry = BlobRegistry::new();
        let a = registry.create_object_url(blob("a.md"));
        let b = registry.create_object_url(blob("b.md"));
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);

        assert!(registry.revoke(&a));
        assert!(!registry.revoke(&a));
        assert!(registry.resolve(&a).is_none());
        assert_eq!(registry.resolve(&b).map(|blob| blob.name.as_str()), Some("b.md"));

        assert_eq!(registry.revoke_all(), 1);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_blob_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.md");
        std::fs::write(&path, "# Title").unwrap();

        let blob = Blob::from_path(&path).unwrap();
        assert_eq!(blob.name, "paper.md");
        assert_eq!(&blob.bytes[..], b"# Title");

        assert!(Blob::from_path(&dir.path().join("missing.md")).is_err());
    }
}
