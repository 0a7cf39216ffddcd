// cache.rs - caller-owned cache of decoded walkmeshes
//
// Entries are keyed by file, window and modification time, so a rewritten
// file is decoded again instead of being served stale.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::error::BwmResult;
use crate::io_bwm::BwmBinaryReader;
use crate::model::Walkmesh;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub offset: usize,
    pub size: usize,
    pub mtime: Option<SystemTime>,
}

impl CacheKey {
    pub fn for_file(path: &Path, offset: usize, size: usize) -> BwmResult<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            offset,
            size,
            mtime: metadata.modified().ok(),
        })
    }

    fn same_window(&self, other: &CacheKey) -> bool {
        self.path == other.path && self.offset == other.offset && self.size == other.size
    }
}

#[derive(Debug, Default)]
pub struct WalkmeshCache {
    entries: Mutex<HashMap<CacheKey, Arc<Walkmesh>>>,
}

impl WalkmeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded walkmesh for the window, decoding on a miss. Decoding happens
    /// outside the lock; if two threads race, the first insert is kept.
    pub fn get_or_load(&self, path: &Path, offset: usize, size: usize) -> BwmResult<Arc<Walkmesh>> {
        let key = CacheKey::for_file(path, offset, size)?;
        if let Some(hit) = self.entries.lock().get(&key) {
            return Ok(Arc::clone(hit));
        }

        let loaded = Arc::new(BwmBinaryReader::from_file(path, offset, size)?);

        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|existing, _| !(existing.same_window(&key) && existing.mtime != key.mtime));
        if entries.len() != before {
            tracing::debug!("Dropped stale walkmesh cache entry for {}", path.display());
        }
        Ok(Arc::clone(entries.entry(key).or_insert(loaded)))
    }

    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.entries.lock().remove(key).is_some()
    }

    /// Drop every window of `path`; returns how many entries went
    pub fn invalidate_path(&self, path: &Path) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| key.path != path);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
