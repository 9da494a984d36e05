//! Path management for envsync
//!
//! Everything lives under the Okta tooling directory in the user's home.
//!
//! ## Path Resolution
//!
//! - Org config: `~/.okta/okta.yaml`
//! - Backup root: `ENVSYNC_BACKUP_DIR` if set, otherwise `~/.okta/<orgName>`
//! - Inside a backup root: `id_mapping.json` and `backup-manifest.json`

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::backup::MANIFEST_FILE_NAME;
use crate::error::EnvsyncError;
use crate::mapping::MAPPING_FILE_NAME;

/// Environment variable that overrides the backup root
pub const BACKUP_DIR_ENV: &str = "ENVSYNC_BACKUP_DIR";

/// Manages all paths used by envsync
#[derive(Debug, Clone)]
pub struct EnvsyncPaths {
    /// The `.okta` directory
    base_dir: PathBuf,
}

impl EnvsyncPaths {
    /// Resolve `~/.okta`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, EnvsyncError> {
        let dirs = BaseDirs::new()
            .ok_or_else(|| EnvsyncError::Config("Could not determine home directory".into()))?;
        Ok(Self {
            base_dir: dirs.home_dir().join(".okta"),
        })
    }

    /// Create EnvsyncPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Default org config file (`~/.okta/okta.yaml`)
    pub fn org_config_file(&self) -> PathBuf {
        self.base_dir.join("okta.yaml")
    }

    /// Default backup root for an org
    pub fn backup_root(&self, org_name: &str) -> PathBuf {
        match std::env::var_os(BACKUP_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => self.base_dir.join(org_name),
        }
    }

    /// ID mapping file inside a backup root
    pub fn mapping_file(root: &Path) -> PathBuf {
        root.join(MAPPING_FILE_NAME)
    }

    /// Manifest file inside a backup root
    pub fn manifest_file(root: &Path) -> PathBuf {
        root.join(MANIFEST_FILE_NAME)
    }
}
