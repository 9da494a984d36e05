//! Info CLI command
//!
//! Shows what a backup directory holds: its manifest and, once a restore
//! has run, the ID mapping statistics.

use clap::Args;
use std::path::PathBuf;

use crate::backup::BackupManifest;
use crate::config::EnvsyncPaths;
use crate::display::{format_manifest, format_mapping};
use crate::error::{EnvsyncError, EnvsyncResult};
use crate::mapping::IdMappingStore;

/// Arguments for `envsync info`
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Backup directory to inspect
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Handle the info command
pub fn handle_info_command(args: InfoArgs) -> EnvsyncResult<()> {
    if !args.input.is_dir() {
        return Err(EnvsyncError::NotFound {
            entity_type: "Backup directory",
            identifier: args.input.display().to_string(),
        });
    }

    println!("Backup directory: {}", args.input.display());
    println!();

    match BackupManifest::load(&args.input)? {
        Some(manifest) => print!("{}", format_manifest(&manifest)),
        None => println!("No backup manifest found."),
    }

    println!();
    let mapping = IdMappingStore::load(EnvsyncPaths::mapping_file(&args.input))?;
    print!("{}", format_mapping(&mapping));

    Ok(())
}
