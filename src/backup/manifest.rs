//! Backup manifest
//!
//! Small JSON document written at the backup root once a backup finishes.
//! Restores do not depend on it; it only describes what a directory holds.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EnvsyncResult;
use crate::storage::file_io::{read_json_required, write_json_atomic};

use super::orchestrator::BackupReport;

/// File name of the manifest inside a backup root
pub const MANIFEST_FILE_NAME: &str = "backup-manifest.json";

/// Current manifest schema version
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Description of a finished backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    /// Schema version for migration support
    pub schema_version: u32,
    /// When the backup finished
    pub created_at: DateTime<Utc>,
    /// Org the backup was taken from, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    pub singleton_records: usize,
    pub independent_records: usize,
    pub dependent_records: usize,
    /// Number of items skipped with a warning
    pub warnings: usize,
}

impl BackupManifest {
    pub fn from_report(report: &BackupReport, org_name: Option<String>) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
            created_at: Utc::now(),
            org_name,
            singleton_records: report.singleton_records,
            independent_records: report.independent_records,
            dependent_records: report.dependent_records,
            warnings: report.warnings.len(),
        }
    }

    /// Path of the manifest under `root`
    pub fn path_in(root: &Path) -> PathBuf {
        root.join(MANIFEST_FILE_NAME)
    }

    pub fn save(&self, root: &Path) -> EnvsyncResult<()> {
        write_json_atomic(Self::path_in(root), self)
    }

    /// Load the manifest under `root`, `None` if there is none
    pub fn load(root: &Path) -> EnvsyncResult<Option<Self>> {
        let path = Self::path_in(root);
        if !path.exists() {
            return Ok(None);
        }
        read_json_required(&path).map(Some)
    }

    pub fn total_records(&self) -> usize {
        self.singleton_records + self.independent_records + self.dependent_records
    }
}
