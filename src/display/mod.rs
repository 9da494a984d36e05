//! Display formatting for terminal output
//!
//! Provides plain-text tables and summaries for the catalog, run reports,
//! backup manifests and ID mappings.

pub mod catalog;
pub mod report;

pub use catalog::format_catalog;
pub use report::{format_backup_report, format_manifest, format_mapping, format_restore_report};
