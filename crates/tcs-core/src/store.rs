//! Latest-reading store.
//!
//! The reader publishes each `ColorReading` here and the web server reads
//! the newest one back. Only the latest snapshot is kept. Readers may observe
//! a snapshot that is one polling cycle old; nothing stronger is promised.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use thiserror::Error;
use tracing::debug;

use crate::model::ColorReading;

/// Errors that can occur while publishing or fetching a reading.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("Store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Snapshot could not be encoded or decoded.
    #[error("Store serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Shared slot holding the most recent reading.
pub trait ReadingStore: Send + Sync {
    /// Replace the stored reading.
    fn publish(&self, reading: &ColorReading) -> Result<(), StoreError>;

    /// Fetch the stored reading, `None` if nothing has been published.
    fn latest(&self) -> Result<Option<ColorReading>, StoreError>;

    /// Drop the stored reading.
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-process store for a reader and server sharing one process.
#[derive(Debug, Default)]
pub struct MemoryReadingStore {
    slot: RwLock<Option<ColorReading>>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadingStore for MemoryReadingStore {
    fn publish(&self, reading: &ColorReading) -> Result<(), StoreError> {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(reading.clone());
        Ok(())
    }

    fn latest(&self) -> Result<Option<ColorReading>, StoreError> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        Ok(slot.clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        Ok(())
    }
}

/// Cross-process store backed by a JSON file.
///
/// Publishing writes a sibling `.tmp` file and renames it over the target,
/// so a concurrent reader sees either the old or the new snapshot, never a
/// torn one.
#[derive(Debug, Clone)]
pub struct FileReadingStore {
    path: PathBuf,
}

impl FileReadingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "latest".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ReadingStore for FileReadingStore {
    fn publish(&self, reading: &ColorReading) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        let json = serde_json::to_vec(reading)?;
        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn latest(&self) -> Result<Option<ColorReading>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Removed stale reading at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ColorLabel, RawFrequencies, Rgb};

    fn reading(r: u8) -> ColorReading {
        ColorReading {
            raw: RawFrequencies::new(f64::from(r), 0.0, 0.0),
            rgb: Rgb::new(r, 0, 0),
            label: ColorLabel::Red,
            tone: None,
            timestamp: "2024-01-17T10:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemoryReadingStore::new();
        assert!(store.latest().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_keeps_only_latest() {
        let store = MemoryReadingStore::new();
        store.publish(&reading(10)).unwrap();
        store.publish(&reading(200)).unwrap();

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.rgb.r, 200);

        store.clear().unwrap();
        assert!(store.latest().unwrap().is_none());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let store = FileReadingStore::new("/run/tcs3200/latest.json");
        assert_eq!(store.temp_path(), PathBuf::from("/run/tcs3200/latest.json.tmp"));
    }
}
