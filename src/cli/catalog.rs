//! Catalog CLI command
//!
//! Prints the resource catalog or exports it as JSON so it can be edited
//! and passed back with `--catalog`.

use clap::Args;
use std::path::PathBuf;

use crate::display::format_catalog;
use crate::error::EnvsyncResult;

use super::load_catalog;

/// Arguments for `envsync catalog`
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Validate and show this catalog file instead of the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Write the catalog as JSON to this file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Handle the catalog command
pub fn handle_catalog_command(args: CatalogArgs) -> EnvsyncResult<()> {
    let catalog = load_catalog(args.catalog.as_deref())?;

    match args.export {
        Some(path) => {
            catalog.save(&path)?;
            println!(
                "Exported {} resource(s) to {}",
                catalog.len(),
                path.display()
            );
        }
        None => print!("{}", format_catalog(&catalog)),
    }

    Ok(())
}
