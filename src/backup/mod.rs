//! Backup system for envsync
//!
//! Copies the configuration of an org into a directory tree, one JSON file
//! per record.
//!
//! # Passes
//!
//! 1. Singleton resources: one `get` call each
//! 2. Independent resources: one `list` call each
//! 3. Dependent resources: one `list` call per identifier of the source type,
//!    where the identifiers come from the file names written in pass 2
//!
//! A failure in any single call is logged and the run continues. A backup
//! always ends with a [`BackupReport`]; the CLI also writes a
//! [`BackupManifest`] next to the records.
//!
//! # Example
//!
//! ```rust,ignore
//! use envsync::backend::CliBackend;
//! use envsync::backup::backup;
//! use envsync::catalog::ResourceCatalog;
//!
//! let catalog = ResourceCatalog::builtin();
//! let backend = CliBackend::default();
//! let report = backup(&catalog, &backend, "/tmp/dev-123456")?;
//! println!("{}", report.summary());
//! ```

mod manifest;
mod orchestrator;

pub use manifest::{BackupManifest, MANIFEST_FILE_NAME, MANIFEST_SCHEMA_VERSION};
pub use orchestrator::{backup, BackupOrchestrator, BackupReport};
