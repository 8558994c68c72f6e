//! cartshelf CLI
//!
//! Command-line interface for importing Super Famicom images into a managed
//! game library.

use std::io::Write;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

mod commands;
mod error;
mod spinner;

use commands::config::{run_config_path, run_config_show};
use commands::import::{ImportArgs, run_import};
use commands::manifest::run_manifest;

#[derive(Parser)]
#[command(name = "cartshelf")]
#[command(about = "Import Super Famicom cartridge images into a game library", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a ROM image or game folder into the library
    Import(ImportArgs),

    /// Print the heuristic manifest for a ROM image without importing it
    Manifest {
        /// ROM image file or game folder
        path: std::path::PathBuf,
    },

    /// Inspect import settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current import settings
    Show,

    /// Print the settings file path
    Path,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import(args) => run_import(args),
        Commands::Manifest { path } => run_manifest(&path),
        Commands::Config { action } => match action {
            ConfigAction::Show => run_config_show(),
            ConfigAction::Path => {
                run_config_path();
                Ok(())
            }
        },
    };

    if let Err(e) = result {
        eprintln!(
            "{} {}",
            "error:".if_supports_color(Stderr, |t| t.red()),
            e,
        );
        std::process::exit(1);
    }
}

/// User-facing output goes through `log::info!`, so info records are printed
/// bare. `RUST_LOG` overrides the default `info` filter.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            if record.level() <= log::Level::Warn {
                writeln!(buf, "{}: {}", record.level(), record.args())
            } else {
                writeln!(buf, "{}", record.args())
            }
        })
        .init();
}
