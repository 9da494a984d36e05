//! Restore CLI command
//!
//! Restores a backup directory onto the configured developer org.

use clap::Args;
use std::path::PathBuf;

use crate::config::EnvsyncPaths;
use crate::display::format_restore_report;
use crate::error::{EnvsyncError, EnvsyncResult};
use crate::restore::{restore, RestoreOptions};

use super::OrgArgs;

/// Arguments for `envsync restore`
#[derive(Args, Debug)]
pub struct RestoreArgs {
    #[command(flatten)]
    pub org: OrgArgs,

    /// Backup directory to restore from
    #[arg(short, long)]
    pub input: PathBuf,

    /// Skip first pass records that already have a mapping entry
    #[arg(long)]
    pub resume: bool,
}

/// Handle the restore command
pub fn handle_restore_command(paths: &EnvsyncPaths, args: RestoreArgs) -> EnvsyncResult<()> {
    if !args.input.is_dir() {
        return Err(EnvsyncError::NotFound {
            entity_type: "Backup directory",
            identifier: args.input.display().to_string(),
        });
    }

    let catalog = args.org.catalog()?;
    let org = args.org.org(paths)?;
    let backend = args.org.backend(&org);
    let options = RestoreOptions {
        resume: args.resume,
    };

    println!("Restoring {} onto {}", args.input.display(), org.org_url);
    if options.resume {
        println!("Resuming: records with an existing mapping will be skipped");
    }

    let report = restore(&catalog, &backend, &args.input, options)?;

    println!();
    print!("{}", format_restore_report(&report));
    println!(
        "ID mapping: {}",
        EnvsyncPaths::mapping_file(&args.input).display()
    );

    Ok(())
}
