//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup and restore engines.

pub mod backup;
pub mod catalog;
pub mod info;
pub mod restore;

use std::path::{Path, PathBuf};

use clap::Args;

use crate::backend::{CliBackend, DEFAULT_CLI_PROGRAM};
use crate::catalog::ResourceCatalog;
use crate::config::{EnvsyncPaths, OrgConfig};
use crate::error::EnvsyncResult;

pub use backup::{handle_backup_command, BackupArgs};
pub use catalog::{handle_catalog_command, CatalogArgs};
pub use info::{handle_info_command, InfoArgs};
pub use restore::{handle_restore_command, RestoreArgs};

/// Options shared by commands that talk to an org
#[derive(Args, Debug, Clone)]
pub struct OrgArgs {
    /// Okta config file (defaults to ~/.okta/okta.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Resource catalog file to use instead of the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Management CLI program used to reach the org
    #[arg(long = "cli", env = "ENVSYNC_CLI", default_value = DEFAULT_CLI_PROGRAM)]
    pub program: String,
}

impl OrgArgs {
    /// Load the org config, enforcing the developer-org guard
    pub fn org(&self, paths: &EnvsyncPaths) -> EnvsyncResult<OrgConfig> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| paths.org_config_file());
        OrgConfig::load(&path)
    }

    pub fn backend(&self, org: &OrgConfig) -> CliBackend {
        CliBackend::new(&self.program).with_config_file(org.config_file.clone())
    }

    pub fn catalog(&self) -> EnvsyncResult<ResourceCatalog> {
        load_catalog(self.catalog.as_deref())
    }
}

/// The catalog at `path`, or the built-in one
pub fn load_catalog(path: Option<&Path>) -> EnvsyncResult<ResourceCatalog> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading resource catalog");
            ResourceCatalog::load(path)
        }
        None => {
            let catalog = ResourceCatalog::builtin();
            catalog.validate()?;
            Ok(catalog)
        }
    }
}
