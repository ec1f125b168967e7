//! File-backed cache store
//!
//! Persists the calendar snapshot as pretty-printed JSON so it survives
//! process restarts.

use async_trait::async_trait;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{CacheError, CacheStore};
use crate::calendar::CacheEntry;

/// File name of the snapshot inside the cache directory
const CACHE_FILE_NAME: &str = "economic-events.json";

/// Stores the snapshot in `<cache_dir>/economic-events.json`
///
/// The default location is the XDG cache directory (`~/.cache/econcal/` on
/// Linux). Writes go to a sibling temp file first and are renamed into place,
/// so a reader never sees a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    /// Directory holding the snapshot file
    cache_dir: PathBuf,
}

impl FileCacheStore {
    /// Creates a store in the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "econcal")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a store in a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory the snapshot lives in
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Full path of the snapshot file
    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE_NAME)
    }

    fn temp_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.tmp", CACHE_FILE_NAME))
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn read(&self) -> Result<Option<CacheEntry>, CacheError> {
        let content = match fs::read_to_string(self.cache_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn write(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        fs::create_dir_all(&self.cache_dir).await?;

        let json = serde_json::to_string_pretty(entry)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, self.cache_path()).await?;

        Ok(())
    }
}
