//! Backup CLI command
//!
//! Backs up the configured developer org into a directory tree and writes
//! the backup manifest next to it.

use clap::Args;
use std::path::PathBuf;

use crate::backup::{backup, BackupManifest};
use crate::config::EnvsyncPaths;
use crate::display::format_backup_report;
use crate::error::EnvsyncResult;

use super::OrgArgs;

/// Arguments for `envsync backup`
#[derive(Args, Debug)]
pub struct BackupArgs {
    #[command(flatten)]
    pub org: OrgArgs,

    /// Directory to write the backup into (defaults to ~/.okta/<orgName>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the backup command
pub fn handle_backup_command(paths: &EnvsyncPaths, args: BackupArgs) -> EnvsyncResult<()> {
    let catalog = args.org.catalog()?;
    let org = args.org.org(paths)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| paths.backup_root(&org.org_name));
    let backend = args.org.backend(&org);

    println!("Backing up {} to {}", org.org_url, output.display());
    let report = backup(&catalog, &backend, &output)?;

    let manifest = BackupManifest::from_report(&report, Some(org.org_name.clone()));
    manifest.save(&output)?;

    println!();
    print!("{}", format_backup_report(&report));
    println!("Location: {}", output.display());

    Ok(())
}
