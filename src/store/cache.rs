//! Last-applied configuration cache
//!
//! An opaque key-value slot. The store writes the configuration here after a
//! successful load or committed mutation while it is connected, and exposes
//! it only as a hint. It is never loaded back into store state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::errors::{GwctlError, Result};

/// Fixed key under which the configuration is cached
pub const CACHE_KEY: &str = "gateway-configuration";

/// Key-value storage for serialized configuration
pub trait ConfigCache: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;

    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Thread-safe in-memory cache
#[derive(Debug, Default)]
pub struct MemoryConfigCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConfigCache for MemoryConfigCache {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries =
            self.entries.read().map_err(|_| GwctlError::internal("cache lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries =
            self.entries.write().map_err(|_| GwctlError::internal("cache lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Cache storing one JSON file per key in a directory
#[derive(Debug, Clone)]
pub struct FileConfigCache {
    dir: PathBuf,
}

impl FileConfigCache {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(GwctlError::validation_field(
                format!("Invalid cache key '{}'", key),
                "key",
            ));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl ConfigCache for FileConfigCache {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        std::fs::read_to_string(&path).map(Some).map_err(|e| GwctlError::Io {
            source: e,
            context: format!("Failed to read cache file: {}", path.display()),
        })
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| GwctlError::Io {
            source: e,
            context: format!("Failed to create cache directory: {}", self.dir.display()),
        })?;

        // Write then rename so readers never see a partial file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| GwctlError::Io {
            source: e,
            context: format!("Failed to write cache file: {}", tmp.display()),
        })?;
        std::fs::rename(&tmp, &path).map_err(|e| GwctlError::Io {
            source: e,
            context: format!("Failed to replace cache file: {}", path.display()),
        })?;

        debug!(path = %path.display(), "wrote configuration cache");
        Ok(())
    }
}
