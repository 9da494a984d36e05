//! envsync - Backup and restore for Okta developer org configuration
//!
//! This library copies the configuration of an identity platform org into a
//! directory of JSON files and recreates it on another org. Objects get new
//! identifiers on the target, so restore records every old to new pair in a
//! persistent ID mapping and translates references through it.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `catalog`: Resource descriptors and the two-level dependency graph
//! - `backend`: The `Backend` trait, the CLI subprocess backend and an
//!   in-memory backend
//! - `storage`: On-disk layout of a backup and atomic JSON writes
//! - `mapping`: Persistent old to new identifier mapping
//! - `backup`: Three-pass backup orchestration and the backup manifest
//! - `restore`: Phased restore orchestration and association handlers
//! - `config`: Path resolution and org config parsing
//! - `display`: Plain-text tables and summaries
//! - `cli`: Command handlers for the binary
//! - `error`: Custom error types
//!
//! # Example
//!
//! ```rust,ignore
//! use envsync::backend::CliBackend;
//! use envsync::catalog::ResourceCatalog;
//! use envsync::restore::{restore, RestoreOptions};
//!
//! let catalog = ResourceCatalog::builtin();
//! let backend = CliBackend::default();
//! let report = restore(&catalog, &backend, "/tmp/dev-123456", RestoreOptions::default())?;
//! println!("{}", report.summary());
//! ```

pub mod backend;
pub mod backup;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod mapping;
pub mod restore;
pub mod storage;

pub use error::{EnvsyncError, EnvsyncResult};
