//! # Catalog Configuration Module
//!
//! Builder-based configuration for the catalog core.
//!
//! ## Required Settings
//!
//! - `database_path` - SQLite database file
//! - `storage_root` - Root directory of the default blob store
//!
//! ## Collaborators (with defaults)
//!
//! - `BlobStore` - Audio payload storage (desktop default: `LocalBlobStore`
//!   rooted at `storage_root`, requires the `desktop-shims` feature)
//! - `Clock` - Time source (default: `SystemClock`)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CatalogConfig;
//!
//! let config = CatalogConfig::builder()
//!     .database_path("/var/lib/catalog/catalog.db")
//!     .storage_root("/var/lib/catalog/blobs")
//!     .max_upload_bytes(50 * 1024 * 1024)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! `build()` fails fast with an actionable message when a required setting
//! or collaborator is missing or a limit is out of range.

use crate::error::{Error, Result};
use bridge_traits::{BlobStore, Clock, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;

/// Default upload limit: 100 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Hard ceiling for the upload limit: 1 GiB
pub const MAX_UPLOAD_BYTES_CEILING: u64 = 1024 * 1024 * 1024;

/// Page size of ranked listings
pub const DEFAULT_SONGS_PER_PAGE: u32 = 5;

/// Catalog configuration.
///
/// Use [`CatalogConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Root directory of the default blob store
    pub storage_root: PathBuf,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: u64,

    /// Page size for ranked song listings
    pub songs_per_page: u32,

    /// Maximum number of pooled database connections
    pub max_connections: u32,

    /// Storage for uploaded audio
    pub blob_store: Arc<dyn BlobStore>,

    /// Time source for timestamps
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("database_path", &self.database_path)
            .field("storage_root", &self.storage_root)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("songs_per_page", &self.songs_per_page)
            .field("max_connections", &self.max_connections)
            .field("blob_store", &"BlobStore { ... }")
            .field("clock", &"Clock { ... }")
            .finish()
    }
}

impl CatalogConfig {
    /// Creates a new builder for constructing a `CatalogConfig`.
    pub fn builder() -> CatalogConfigBuilder {
        CatalogConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Database path and storage root are not empty
    /// - Upload limit is > 0 and within the 1 GiB ceiling
    /// - Page size is between 1 and 100
    /// - At least one database connection is allowed
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(Error::Config("Database path cannot be empty".to_string()));
        }

        if self.storage_root.as_os_str().is_empty() {
            return Err(Error::Config("Storage root cannot be empty".to_string()));
        }

        if self.max_upload_bytes == 0 {
            return Err(Error::Config(
                "Upload limit must be greater than 0 bytes".to_string(),
            ));
        }

        if self.max_upload_bytes > MAX_UPLOAD_BYTES_CEILING {
            return Err(Error::Config(
                "Upload limit exceeds maximum of 1 GiB".to_string(),
            ));
        }

        if !(1..=100).contains(&self.songs_per_page) {
            return Err(Error::Config(
                "Songs per page must be between 1 and 100".to_string(),
            ));
        }

        if self.max_connections == 0 {
            return Err(Error::Config(
                "At least one database connection is required".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_blob_store(storage_root: &std::path::Path) -> Result<Arc<dyn BlobStore>> {
    use bridge_desktop::LocalBlobStore;

    let store: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(storage_root));
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_blob_store(_storage_root: &std::path::Path) -> Result<Arc<dyn BlobStore>> {
    Err(Error::CapabilityMissing {
        capability: "BlobStore".to_string(),
        message: "BlobStore implementation is required for song uploads and playback. \
                 Enable the 'desktop-shims' feature to use the default LocalBlobStore \
                 or inject an object-storage adapter with .blob_store()."
            .to_string(),
    })
}

/// Builder for constructing [`CatalogConfig`] instances.
#[derive(Default)]
pub struct CatalogConfigBuilder {
    database_path: Option<PathBuf>,
    storage_root: Option<PathBuf>,
    max_upload_bytes: Option<u64>,
    songs_per_page: Option<u32>,
    max_connections: Option<u32>,
    blob_store: Option<Arc<dyn BlobStore>>,
    clock: Option<Arc<dyn Clock>>,
}

impl CatalogConfigBuilder {
    /// Sets the database path.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::CatalogConfig;
    ///
    /// let builder = CatalogConfig::builder()
    ///     .database_path("/path/to/catalog.db");
    /// ```
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Sets the root directory for stored audio.
    pub fn storage_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.storage_root = Some(path.into());
        self
    }

    /// Sets the upload limit in bytes.
    ///
    /// Default: 100 MiB
    pub fn max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Sets the page size of ranked listings.
    ///
    /// Default: 5
    pub fn songs_per_page(mut self, size: u32) -> Self {
        self.songs_per_page = Some(size);
        self
    }

    /// Sets the maximum number of pooled database connections.
    ///
    /// Default: 5
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    /// Injects a custom blob store (e.g. an object-storage adapter).
    pub fn blob_store(mut self, store: Arc<dyn BlobStore>) -> Self {
        self.blob_store = Some(store);
        self
    }

    /// Injects a custom clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<CatalogConfig> {
        let database_path = self.database_path.ok_or_else(|| {
            Error::Config("Database path is required. Use .database_path() to set it.".to_string())
        })?;

        let storage_root = self.storage_root.ok_or_else(|| {
            Error::Config("Storage root is required. Use .storage_root() to set it.".to_string())
        })?;

        let blob_store = match self.blob_store {
            Some(store) => store,
            None => provide_default_blob_store(&storage_root)?,
        };

        let config = CatalogConfig {
            database_path,
            storage_root,
            max_upload_bytes: self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            songs_per_page: self.songs_per_page.unwrap_or(DEFAULT_SONGS_PER_PAGE),
            max_connections: self.max_connections.unwrap_or(5),
            blob_store,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::BlobStream;
    use bytes::Bytes;

    struct NullBlobStore;

    #[async_trait]
    impl BlobStore for NullBlobStore {
        async fn put(&self, _key: &str, _data: Bytes, _content_type: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn get(&self, key: &str) -> BridgeResult<Bytes> {
            Err(bridge_traits::BridgeError::NotFound(key.to_string()))
        }

        async fn open_read_stream(&self, key: &str) -> BridgeResult<BlobStream> {
            Err(bridge_traits::BridgeError::NotFound(key.to_string()))
        }

        async fn delete(&self, _key: &str) -> BridgeResult<()> {
            Ok(())
        }

        async fn exists(&self, _key: &str) -> BridgeResult<bool> {
            Ok(false)
        }
    }

    fn builder_with_store() -> CatalogConfigBuilder {
        CatalogConfig::builder()
            .database_path("/tmp/catalog.db")
            .storage_root("/tmp/blobs")
            .blob_store(Arc::new(NullBlobStore))
    }

    #[test]
    fn test_builder_with_all_required_fields() {
        let config = builder_with_store().build().unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/catalog.db"));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.songs_per_page, DEFAULT_SONGS_PER_PAGE);
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_builder_requires_database_path() {
        let result = CatalogConfig::builder()
            .storage_root("/tmp/blobs")
            .blob_store(Arc::new(NullBlobStore))
            .build();

        match result {
            Err(Error::Config(msg)) => assert!(msg.contains("Database path is required")),
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_requires_storage_root() {
        let result = CatalogConfig::builder()
            .database_path("/tmp/catalog.db")
            .blob_store(Arc::new(NullBlobStore))
            .build();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_blob_store_without_shims() {
        let result = CatalogConfig::builder()
            .database_path("/tmp/catalog.db")
            .storage_root("/tmp/blobs")
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => assert_eq!(capability, "BlobStore"),
            other => panic!("Expected missing capability, got {:?}", other),
        }
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_builder_provides_local_blob_store() {
        let config = CatalogConfig::builder()
            .database_path("/tmp/catalog.db")
            .storage_root("/tmp/blobs")
            .build();

        assert!(config.is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_upload_limit() {
        let result = builder_with_store().max_upload_bytes(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_excessive_upload_limit() {
        let result = builder_with_store()
            .max_upload_bytes(MAX_UPLOAD_BYTES_CEILING + 1)
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_page_size() {
        assert!(builder_with_store().songs_per_page(0).build().is_err());
        assert!(builder_with_store().songs_per_page(101).build().is_err());
        assert!(builder_with_store().songs_per_page(20).build().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_connections() {
        assert!(builder_with_store().max_connections(0).build().is_err());
    }

    #[test]
    fn test_debug_hides_collaborators() {
        let config = builder_with_store().build().unwrap();
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("BlobStore { ... }"));
        assert!(rendered.contains("catalog.db"));
    }
}
