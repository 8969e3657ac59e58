//! # Catalog Library Module
//!
//! Owns the catalog database and the rules that only need the data model.
//!
//! ## Overview
//!
//! This crate provides:
//! - SQLite schema, migrations and connection pooling
//! - Repository traits with sqlx implementations for users, songs,
//!   playlists, reactions, listens and comments
//! - Field validation for song metadata, playlist names and comments
//! - Ranked and paginated song queries

pub mod db;
pub mod error;
pub mod models;
pub mod query;
pub mod repositories;
pub mod validation;

pub use error::{LibraryError, Result};
