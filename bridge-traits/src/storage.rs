//! Blob Storage Abstraction
//!
//! The catalog keeps song metadata in its own database but the audio payload
//! lives in an external blob store addressed by string keys such as
//! `uploaded-songs/<uuid>.mp3`. This module defines that contract.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use tokio::io::AsyncRead;

use crate::error::Result;

/// Readable handle over a stored blob.
///
/// Returned by [`BlobStore::open_read_stream`] so large payloads can be
/// streamed to the caller instead of buffered in memory.
pub struct BlobStream {
    /// MIME type of the payload
    pub content_type: String,
    /// Payload size in bytes, when the backend knows it
    pub size: Option<u64>,
    /// Reader positioned at the start of the payload
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl fmt::Debug for BlobStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobStream")
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .field("reader", &"AsyncRead { ... }")
            .finish()
    }
}

/// Blob storage trait
///
/// Implementations must treat each call as atomic from the caller's point of
/// view: a failed `put` leaves no partial object behind.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::BlobStore;
///
/// async fn store(blobs: &dyn BlobStore, data: Bytes) -> Result<()> {
///     blobs.put("uploaded-songs/intro.mp3", data, "audio/mpeg").await
/// }
/// ```
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing object
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;

    /// Read the entire object into memory
    ///
    /// Returns [`BridgeError::NotFound`](crate::BridgeError::NotFound) when
    /// the key does not exist.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Open the object for streaming reads
    async fn open_read_stream(&self, key: &str) -> Result<BlobStream>;

    /// Delete the object. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check whether an object exists under `key`
    async fn exists(&self, key: &str) -> Result<bool>;
}

/// Best-effort MIME type for a blob key based on its extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}
