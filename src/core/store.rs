//! Key-value persistence for page notes

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace shared by every note key
pub const NOTES_KEY_PREFIX: &str = "notes:";

/// Errors raised by a storage backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file {path} is malformed: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage is unavailable: {0}")]
    Unavailable(String),
}

/// A string-to-string store scoped to one installation
pub trait KeyValueStore {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Volatile store, used for tests and `--ephemeral` sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a directory holding one JSON file per key
///
/// A `set` only ever touches its own key's file, so windows for different
/// pages can share the directory. Reads always go to disk and see writes made
/// by other processes. Each write goes to a per-process temp file first and is
/// renamed into place.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    value: String,
}

impl FileStore {
    /// Open the store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        tracing::info!("Opened note store at {}", dir.display());
        Ok(Self { dir })
    }

    /// Open the store in the platform data directory
    pub fn open_default() -> Result<Self, StoreError> {
        let dir = ProjectDirs::from("com", "refnotes", "RefNotes")
            .map(|dirs| dirs.data_dir().join("notes"))
            .ok_or_else(|| StoreError::Unavailable("could not determine data directory".into()))?;
        Self::open(dir)
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}.tmp", encode_key(key), std::process::id()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.entry_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let entry: StoredEntry =
            serde_json::from_str(&content).map_err(|source| StoreError::Format { path, source })?;
        Ok(Some(entry.value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.entry_path(key);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };

        let entry = StoredEntry {
            key: key.to_string(),
            value: value.to_string(),
        };
        let content = serde_json::to_string_pretty(&entry).map_err(|source| StoreError::Format {
            path: path.clone(),
            source,
        })?;

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let tmp = self.temp_path(key);
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        Ok(())
    }
}

/// File name stem for a key. Only lowercase ASCII letters, digits, `-` and `_`
/// are kept; every other byte is percent-encoded, so distinct keys never map
/// to the same file even on case-insensitive filesystems.
fn encode_key(key: &str) -> String {
    let mut name = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => name.push(byte as char),
            _ => name.push_str(&format!("%{:02X}", byte)),
        }
    }
    name
}

/// Storage key for a page's notes
pub fn storage_key(page_id: &str) -> String {
    format!("{}{}", NOTES_KEY_PREFIX, page_id)
}

/// Note persistence keyed by page identifier
pub struct NoteStore {
    backend: Box<dyn KeyValueStore>,
}

impl NoteStore {
    /// Wrap a storage backend
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Load the notes for `page_id`, or an empty string if none were saved
    pub fn load(&self, page_id: &str) -> Result<String, StoreError> {
        Ok(self.backend.get(&storage_key(page_id))?.unwrap_or_default())
    }

    /// Persist the notes for `page_id`
    pub fn save(&mut self, page_id: &str, text: &str) -> Result<(), StoreError> {
        self.backend.set(&storage_key(page_id), text)
    }
}
