//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for servers and desktops.
//!
//! ## Overview
//!
//! - `BlobStore` backed by a local directory tree using `tokio::fs`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::LocalBlobStore;
//! use bridge_traits::BlobStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let blobs = LocalBlobStore::new("/var/lib/catalog/blobs");
//!     blobs.put("uploaded-songs/a.mp3", data, "audio/mpeg").await?;
//! }
//! ```

mod filesystem;

pub use filesystem::LocalBlobStore;
