//! # Host Bridge Traits
//!
//! Contracts between the catalog core and the collaborators it does not own.
//!
//! ## Traits
//!
//! - [`BlobStore`](storage::BlobStore) - Binary storage for uploaded audio
//!   (`put`, `get`, streaming reads, `delete`)
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Host
//! implementations should convert platform errors into it and keep the
//! missing-object case distinguishable through [`BridgeError::NotFound`].
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single implementation can be
//! shared across concurrent requests.

pub mod error;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use storage::{content_type_for_key, BlobStore, BlobStream};
pub use time::{Clock, FixedClock, LogEntry, LogLevel, LoggerSink, SystemClock};
