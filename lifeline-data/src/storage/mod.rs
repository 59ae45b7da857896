//! Object storage for uploaded files
//!
//! Objects are addressed by a relative key such as `reports/7/scan.png` and
//! written below a root directory. Each stored object has a public URL built
//! from the configured base, which the API serves back read-only.

use std::io::Write;
use std::path::Path;

use async_trait::async_trait;
use strict_path::{PathBoundary, StrictPath, StrictPathError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Error type for object storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key is empty or resolves outside the root
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// An object already exists under the key
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    /// Root directory could not be created or opened
    #[error("Invalid storage root: {0}")]
    InvalidRoot(#[source] StrictPathError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking filesystem task failed to complete
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Write-once object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`; fails if the key is taken
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Remove the object under `key`; a missing object is not an error
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Public URL for `key`
    fn public_url(&self, key: &str) -> String;
}

/// Object store backed by a local directory
///
/// Every key is resolved through a [`PathBoundary`], so `..` segments,
/// absolute keys and symlinks pointing out of the root are all refused.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    boundary: PathBoundary,
    public_base_url: String,
}

impl LocalObjectStore {
    /// Open the store, creating the root directory if needed
    pub fn open(root: impl AsRef<Path>, public_base_url: impl Into<String>) -> Result<Self, StorageError> {
        let boundary = PathBoundary::try_new_create(root.as_ref()).map_err(StorageError::InvalidRoot)?;
        info!("Object store rooted at {}", boundary.strictpath_display());

        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            boundary,
            public_base_url,
        })
    }

    /// Directory objects are written to
    pub fn root(&self) -> &Path {
        Path::new(self.boundary.interop_path())
    }

    async fn blocking<F, R>(&self, key: &str, f: F) -> Result<R, StorageError>
    where
        F: FnOnce(StrictPath) -> Result<R, StorageError> + Send + 'static,
        R: Send + 'static,
    {
        let boundary = self.boundary.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let path = resolve(&boundary, &key)?;
            f(path)
        })
        .await?
    }
}

fn resolve(boundary: &PathBoundary, key: &str) -> Result<StrictPath, StorageError> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    boundary.strict_join(key).map_err(|e| {
        warn!("Rejected object key {:?}: {}", key, e);
        StorageError::InvalidKey(key.to_string())
    })
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let bytes = bytes.to_vec();
        let len = bytes.len();
        let owned_key = key.to_string();

        self.blocking(key, move |path| {
            path.create_parent_dir_all()?;
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path.interop_path())
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(owned_key),
                    _ => StorageError::Io(e),
                })?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(())
        })
        .await?;

        debug!("Stored {} bytes at {}", len, key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.blocking(key, |path| match path.remove_file() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        })
        .await?;

        debug!("Removed object {}", key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
