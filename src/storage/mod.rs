//! Durable key/value storage for the operator session.
//!
//! Two backends:
//!
//! - [`FileStorage`]: a small JSON object on disk (`~/.admin-console/storage.json`
//!   by default). Every read goes back to the file so a change made by another
//!   process is picked up on the next read.
//! - [`MemoryStorage`]: process-local, used in tests and whenever the file
//!   backend cannot be opened. Nothing written to it outlives the process.
//!
//! Storage operations never fail from the caller's point of view: I/O errors
//! are logged and the operation degrades to a no-op.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// A string key/value store standing in for browser local storage.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

/// JSON-file storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Open (or create) the storage file at `path`.
    ///
    /// Fails if the parent directory cannot be created or the file exists but
    /// is not writable.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        if !path.exists() {
            fs::write(&path, "{}")
                .with_context(|| format!("failed to create {}", path.display()))?;
        } else if fs::metadata(&path)
            .with_context(|| format!("failed to stat {}", path.display()))?
            .permissions()
            .readonly()
        {
            anyhow::bail!("storage file {} is read-only", path.display());
        }

        Ok(Self { path })
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed storage file");
                BTreeMap::new()
            }
        }
    }

    /// Replace the file in one rename, so readers see the old or the new
    /// content and never a partial write.
    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries).context("failed to serialize storage")?;

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .context("failed to write storage temp file")?;
        tmp.persist(&self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) {
        let mut entries = self.read_entries();
        f(&mut entries);
        if let Err(e) = self.write_entries(&entries) {
            tracing::warn!(error = %e, "storage write failed");
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.read_entries().remove(key)
    }

    fn set(&self, key: &str, value: &str) {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        });
    }

    fn remove(&self, key: &str) {
        self.update(|entries| {
            entries.remove(key);
        });
    }
}

/// Default storage file: `~/.admin-console/storage.json`.
pub fn default_storage_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".admin-console").join("storage.json"))
}

/// Open the durable storage at `path`, falling back to memory.
///
/// When the file backend is unavailable the session never persists and every
/// process start requires a fresh login.
pub fn open_or_memory(path: Option<PathBuf>) -> Rc<dyn Storage> {
    let Some(path) = path else {
        tracing::debug!("ephemeral session storage");
        return Rc::new(MemoryStorage::new());
    };

    match FileStorage::open(&path) {
        Ok(storage) => Rc::new(storage),
        Err(e) => {
            tracing::warn!(error = %e, "durable storage unavailable; session will not persist");
            Rc::new(MemoryStorage::new())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
