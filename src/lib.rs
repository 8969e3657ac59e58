//! Workspace facade crate.
//!
//! Hosts depend on `catalog-workspace` and get the catalog service from
//! `core-service` without wiring each crate individually. The default
//! `desktop-shims` feature pulls in the filesystem-backed blob store.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;
