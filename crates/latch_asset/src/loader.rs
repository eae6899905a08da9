// loader.rs - Asset loader collaborators
//
// Loaders are synchronous: `load_now` returns once bytes are available or
// known to be missing. Missing assets are reported as zero-sized, never as
// an error, so callers only have one "not found" path to check.

use crate::SimpleAsset;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of raw asset bytes.
pub trait AssetLoader: Send + Sync {
    /// Load `filename` synchronously. A zero-sized asset signals "not found".
    fn load_now(&self, filename: &str) -> Arc<SimpleAsset>;
}

/// Loads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileAssetLoader {
    root: PathBuf,
}

impl FileAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn try_load(&self, filename: &str) -> Result<SimpleAsset, AssetError> {
        let path = self.root.join(filename);
        std::fs::read(&path)
            .map(SimpleAsset::new)
            .map_err(|source| AssetError::Io { path, source })
    }
}

impl AssetLoader for FileAssetLoader {
    fn load_now(&self, filename: &str) -> Arc<SimpleAsset> {
        match self.try_load(filename) {
            Ok(asset) => {
                tracing::debug!(filename, size = asset.size(), "loaded asset");
                Arc::new(asset)
            }
            Err(err) => {
                tracing::warn!("{err}");
                Arc::new(SimpleAsset::empty())
            }
        }
    }
}

/// In-memory loader used by tooling and tests.
///
/// Counts every `load_now` call so callers can verify caching behaviour.
#[derive(Default)]
pub struct MemoryAssetLoader {
    files: DashMap<String, Vec<u8>>,
    loads: AtomicUsize,
}

impl MemoryAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, filename: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.files.insert(filename.into(), data.into());
    }

    /// Number of `load_now` calls served so far, hits and misses alike.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl AssetLoader for MemoryAssetLoader {
    fn load_now(&self, filename: &str) -> Arc<SimpleAsset> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let asset = self
            .files
            .get(filename)
            .map(|data| SimpleAsset::new(data.value().clone()))
            .unwrap_or_default();
        Arc::new(asset)
    }
}
