//! Blob storage on the local file system using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{content_type_for_key, BlobStore, BlobStream},
};
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Directory-backed blob store
///
/// Keys map to relative paths under `root`. Writes go to a temporary sibling
/// file first and are renamed into place, so readers never observe a partial
/// object.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a blob store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Blob store under the platform data directory
    pub fn in_data_dir() -> Self {
        let root = dirs::data_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".local")
                    .join("share")
            })
            .join("catalog-core")
            .join("blobs");

        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a key to a path, refusing anything that escapes the root.
    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !is_plain {
            return Err(BridgeError::OperationFailed(format!(
                "Invalid blob key: {}",
                key
            )));
        }

        Ok(self.root.join(relative))
    }

    fn map_io_error(key: &str, e: std::io::Error) -> BridgeError {
        if e.kind() == std::io::ErrorKind::NotFound {
            BridgeError::NotFound(key.to_string())
        } else {
            BridgeError::Io(e)
        }
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let staging = path.with_extension(format!("{}.part", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&staging).await?;
        let written = async {
            file.write_all(data.as_ref()).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            discard_staging(&staging).await;
            return Err(BridgeError::Io(e));
        }

        if let Err(e) = fs::rename(&staging, &path).await {
            discard_staging(&staging).await;
            return Err(BridgeError::Io(e));
        }

        debug!(key, content_type, size = data.len(), "Stored blob");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.resolve(key)?;
        let data = fs::read(&path)
            .await
            .map_err(|e| Self::map_io_error(key, e))?;
        debug!(key, size = data.len(), "Read blob");
        Ok(Bytes::from(data))
    }

    async fn open_read_stream(&self, key: &str) -> Result<BlobStream> {
        let path = self.resolve(key)?;
        let file = fs::File::open(&path)
            .await
            .map_err(|e| Self::map_io_error(key, e))?;
        let size = file.metadata().await.ok().map(|m| m.len());
        debug!(key, ?size, "Opened blob for streaming");

        Ok(BlobStream {
            content_type: content_type_for_key(key).to_string(),
            size,
            reader: Box::new(file),
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "Deleted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(key, "Blob already absent");
                Ok(())
            }
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        Ok(fs::try_exists(&path).await?)
    }
}

async fn discard_staging(staging: &Path) {
    if let Err(e) = fs::remove_file(staging).await {
        warn!(error = %e, path = %staging.display(), "Failed to remove staging file");
    }
}
