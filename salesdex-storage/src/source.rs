//! Dataset sources.
//!
//! A [`DatasetSource`] hands the store a forward-only byte stream per dataset.
//! Loaders never ask for the whole document at once.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use salesdex_core::{DatasetKind, LoadError, SalesdexConfig, SalesdexResult, StoreError};

/// Read buffer used for on-disk datasets.
const FILE_BUFFER_BYTES: usize = 64 * 1024;

/// Byte stream handed to a loader.
pub type DatasetReader = Box<dyn Read + Send>;

/// Provider of dataset byte streams.
pub trait DatasetSource: Send + Sync {
    /// Open a fresh stream for the given dataset.
    fn open(&self, kind: DatasetKind) -> SalesdexResult<DatasetReader>;

    /// Human readable location of the dataset, used in logs and errors.
    fn describe(&self, kind: DatasetKind) -> String;
}

/// Datasets read from files on disk.
#[derive(Debug, Clone, Default)]
pub struct FileSources {
    paths: HashMap<DatasetKind, PathBuf>,
}

impl FileSources {
    /// Build from an explicit dataset-type to file-path mapping.
    pub fn new(paths: impl IntoIterator<Item = (DatasetKind, PathBuf)>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// Build from the configured data directory and file names.
    pub fn from_config(config: &SalesdexConfig) -> Self {
        Self::new(config.dataset_paths())
    }

    pub fn path(&self, kind: DatasetKind) -> Option<&PathBuf> {
        self.paths.get(&kind)
    }
}

impl DatasetSource for FileSources {
    fn open(&self, kind: DatasetKind) -> SalesdexResult<DatasetReader> {
        let path = self.paths.get(&kind).ok_or_else(|| LoadError::SourceUnavailable {
            dataset: kind,
            location: "<unset>".to_string(),
            reason: "no path configured".to_string(),
        })?;
        let file = File::open(path).map_err(|e| LoadError::SourceUnavailable {
            dataset: kind,
            location: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Box::new(BufReader::with_capacity(FILE_BUFFER_BYTES, file)))
    }

    fn describe(&self, kind: DatasetKind) -> String {
        self.paths
            .get(&kind)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unset>".to_string())
    }
}

/// In-memory datasets for tests and fixtures.
///
/// Documents can be replaced between loads, and every `open` is counted so
/// tests can observe how often the store actually read a dataset.
#[derive(Debug, Default)]
pub struct InMemorySources {
    documents: RwLock<HashMap<DatasetKind, Arc<[u8]>>>,
    opens: [AtomicU64; 4],
    open_delay: Option<Duration>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Self::set`].
    pub fn with_document(self, kind: DatasetKind, document: impl Into<Vec<u8>>) -> Self {
        self.documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(kind, shared(document));
        self
    }

    /// Sleep this long inside every `open`, widening race windows in tests.
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    /// Replace the document served for a dataset.
    pub fn set(&self, kind: DatasetKind, document: impl Into<Vec<u8>>) {
        self.documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(kind, shared(document));
    }

    /// Number of times the dataset was opened.
    pub fn open_count(&self, kind: DatasetKind) -> u64 {
        self.opens[kind.index()].load(Ordering::SeqCst)
    }
}

impl DatasetSource for InMemorySources {
    fn open(&self, kind: DatasetKind) -> SalesdexResult<DatasetReader> {
        self.opens[kind.index()].fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.open_delay {
            std::thread::sleep(delay);
        }
        let documents = self.documents.read().map_err(|_| StoreError::LockPoisoned)?;
        let document = documents
            .get(&kind)
            .cloned()
            .ok_or_else(|| LoadError::SourceUnavailable {
                dataset: kind,
                location: self.describe(kind),
                reason: "no document registered".to_string(),
            })?;
        Ok(Box::new(Cursor::new(document)))
    }

    fn describe(&self, kind: DatasetKind) -> String {
        format!("memory://{}", kind)
    }
}

fn shared(document: impl Into<Vec<u8>>) -> Arc<[u8]> {
    let bytes: Vec<u8> = document.into();
    Arc::from(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdex_core::SalesdexError;

    #[test]
    fn test_in_memory_counts_opens() {
        let sources = InMemorySources::new().with_document(DatasetKind::Categories, "[]");
        let mut body = String::new();
        sources
            .open(DatasetKind::Categories)
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "[]");
        assert_eq!(sources.open_count(DatasetKind::Categories), 1);
        assert_eq!(sources.open_count(DatasetKind::Sales), 0);
    }

    #[test]
    fn test_in_memory_missing_document() {
        let sources = InMemorySources::new();
        let err = sources.open(DatasetKind::Sales).err().unwrap();
        assert!(matches!(
            err,
            SalesdexError::Load(LoadError::SourceUnavailable {
                dataset: DatasetKind::Sales,
                ..
            })
        ));
    }

    #[test]
    fn test_file_sources_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let sources = FileSources::new([(DatasetKind::Products, dir.path().join("nope.json"))]);
        let err = sources.open(DatasetKind::Products).err().unwrap();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_file_sources_from_config() {
        let config = SalesdexConfig {
            data_dir: PathBuf::from("/srv/salesdex"),
            ..Default::default()
        };
        let sources = FileSources::from_config(&config);
        assert_eq!(
            sources.describe(DatasetKind::Contacts),
            "/srv/salesdex/contacts.json"
        );
    }
}
