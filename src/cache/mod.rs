//! Cache stores for the calendar snapshot
//!
//! The service keeps exactly one [`CacheEntry`] at a time. Stores persist it
//! behind the [`CacheStore`] trait so the service can run against the
//! filesystem in production and an in-memory slot in tests.

mod file;
mod memory;

pub use file::FileCacheStore;
pub use memory::MemoryCacheStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::calendar::CacheEntry;

/// Errors raised by a cache store
///
/// The service never surfaces these to callers: read failures count as a
/// miss and write failures are logged.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Filesystem read or write failed
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored snapshot could not be encoded or decoded
    #[error("cache entry is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable single-slot storage for the calendar snapshot
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored entry, or `None` if nothing has been written yet
    async fn read(&self) -> Result<Option<CacheEntry>, CacheError>;

    /// Replaces the stored entry
    async fn write(&self, entry: &CacheEntry) -> Result<(), CacheError>;
}
