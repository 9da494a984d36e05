use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use envsync::cli::{
    handle_backup_command, handle_catalog_command, handle_info_command, handle_restore_command,
    BackupArgs, CatalogArgs, InfoArgs, RestoreArgs,
};
use envsync::config::EnvsyncPaths;

#[derive(Parser)]
#[command(
    name = "envsync",
    author = "Kaylee Beyene",
    version,
    about = "Back up and restore the configuration of an Okta developer org",
    long_about = "envsync copies the configuration of an Okta developer org into a \
                  directory of JSON files, and recreates it on another org. New \
                  object IDs are tracked in id_mapping.json so references between \
                  objects survive the move."
)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Back up the configured org
    Backup(BackupArgs),

    /// Restore a backup onto the configured org
    Restore(RestoreArgs),

    /// Show or export the resource catalog
    Catalog(CatalogArgs),

    /// Show what a backup directory holds
    Info(InfoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Backup(args) => {
            let paths = EnvsyncPaths::new()?;
            handle_backup_command(&paths, args)?;
        }
        Commands::Restore(args) => {
            let paths = EnvsyncPaths::new()?;
            handle_restore_command(&paths, args)?;
        }
        Commands::Catalog(args) => handle_catalog_command(args)?,
        Commands::Info(args) => handle_info_command(args)?,
    }

    Ok(())
}

/// Log to stderr so stdout only carries the summaries
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("envsync=debug,info")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
