//! In-process cache store

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheError, CacheStore};
use crate::calendar::CacheEntry;

/// Keeps the snapshot in memory only; contents are lost on restart
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    slot: RwLock<Option<CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `entry`
    pub fn with_entry(entry: CacheEntry) -> Self {
        Self {
            slot: RwLock::new(Some(entry)),
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn read(&self) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.slot.read().await.clone())
    }

    async fn write(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        *self.slot.write().await = Some(entry.clone());
        Ok(())
    }
}
