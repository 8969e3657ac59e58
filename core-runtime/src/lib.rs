//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the catalog core:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! Other crates depend on this one for the logging conventions and the
//! validated [`CatalogConfig`](config::CatalogConfig) they are built from.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
