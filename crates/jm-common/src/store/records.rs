use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// The three JSON documents backing the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Workers,
    Contractors,
    Availability,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Workers => "workers",
            Collection::Contractors => "contractors",
            Collection::Availability => "availability",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Workers => "workers.json",
            Collection::Contractors => "contractors.json",
            Collection::Availability => "availability.json",
        }
    }
}

/// Where each collection lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub workers_path: PathBuf,
    pub contractors_path: PathBuf,
    pub availability_path: PathBuf,
}

impl StoreConfig {
    /// Lay out all three documents under one data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            workers_path: dir.join(Collection::Workers.file_name()),
            contractors_path: dir.join(Collection::Contractors.file_name()),
            availability_path: dir.join(Collection::Availability.file_name()),
        }
    }

    pub fn path(&self, collection: Collection) -> &Path {
        match collection {
            Collection::Workers => &self.workers_path,
            Collection::Contractors => &self.contractors_path,
            Collection::Availability => &self.availability_path,
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed document {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize document for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A whole-file JSON document. The `Default` value is the empty shape
/// written for a missing file and substituted for an unreadable one.
pub trait Document: Serialize + DeserializeOwned + Default + Send + Sync {}

impl<T> Document for T where T: Serialize + DeserializeOwned + Default + Send + Sync {}

/// Load/save of whole JSON documents, one file per [`Collection`].
///
/// Every save rewrites the complete file; a crash mid-write can leave a
/// truncated document behind, which the next load treats as malformed.
#[derive(Debug, Clone)]
pub struct RecordStore {
    config: StoreConfig,
}

impl RecordStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Load a document, creating the file with the empty default when it
    /// does not exist yet.
    #[instrument(skip(self), fields(collection = collection.as_str()))]
    pub async fn try_load<T: Document>(&self, collection: Collection) -> Result<T, StorageError> {
        let path = self.config.path(collection);

        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "document missing; creating empty default");
                let empty = T::default();
                self.save(collection, &empty).await?;
                return Ok(empty);
            }
            Err(source) => {
                return Err(StorageError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_slice(&raw).map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a document, degrading to the empty default on any failure.
    ///
    /// Malformed content is left on disk untouched; the next save for the
    /// collection overwrites it.
    pub async fn load<T: Document>(&self, collection: Collection) -> T {
        match self.try_load(collection).await {
            Ok(document) => document,
            Err(err) => {
                warn!(
                    collection = collection.as_str(),
                    error = %err,
                    "document unavailable; using empty default"
                );
                T::default()
            }
        }
    }

    /// Serialize the full document and rewrite its file.
    #[instrument(skip(self, document), fields(collection = collection.as_str()))]
    pub async fn save<T: Document>(
        &self,
        collection: Collection,
        document: &T,
    ) -> Result<(), StorageError> {
        let path = self.config.path(collection);

        let payload =
            serde_json::to_vec_pretty(document).map_err(|source| StorageError::Serialize {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::Write {
                    path: path.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, payload)
            .await
            .map_err(|source| StorageError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}
