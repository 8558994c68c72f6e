use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cartshelf_import::settings::resolve_library_path;
use cartshelf_import::{
    ImportProgress, ImportSettings, Importer, LogProgress, RawImage, ReleaseDatabase,
    SilentProgress, game_title, load_settings,
};

use crate::error::CliError;
use crate::spinner::SpinnerProgress;

#[derive(Args)]
pub(crate) struct ImportArgs {
    /// ROM image file or game folder
    path: PathBuf,

    /// Directory holding external coprocessor firmware
    /// (default: next to the image)
    #[arg(long)]
    firmware_dir: Option<PathBuf>,

    /// Library root (overrides the saved setting)
    #[arg(long)]
    library: Option<PathBuf>,

    /// Release database file (overrides the saved setting)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Skip the release database lookup
    #[arg(long)]
    no_database: bool,

    /// Do not fall back to header heuristics
    #[arg(long)]
    no_heuristics: bool,

    /// Write manifest.bml into the game folder
    #[arg(long)]
    manifests: bool,

    /// Hide import progress
    #[arg(short, long)]
    quiet: bool,
}

/// Saved settings with the command-line overrides applied.
fn effective_settings(args: &ImportArgs) -> Result<ImportSettings, CliError> {
    let mut settings = load_settings()?;
    settings.library_path = resolve_library_path(args.library.clone(), &settings);
    if args.no_database {
        settings.use_database = false;
    }
    if args.no_heuristics {
        settings.use_heuristics = false;
    }
    if args.manifests {
        settings.create_manifests = true;
    }
    if let Some(database) = &args.database {
        settings.database_path = Some(database.clone());
    }
    Ok(settings)
}

fn load_database(settings: &ImportSettings) -> Result<ReleaseDatabase, CliError> {
    match &settings.database_path {
        Some(path) if settings.use_database => Ok(ReleaseDatabase::load(path)?),
        _ => {
            log::debug!("No release database configured");
            Ok(ReleaseDatabase::empty())
        }
    }
}

/// Run the import command.
pub(crate) fn run_import(args: ImportArgs) -> Result<(), CliError> {
    let settings = effective_settings(&args)?;
    let database = load_database(&settings)?;
    let image = RawImage::load(&args.path)?;
    if image.is_empty() {
        return Err(CliError::other(format!(
            "{} contains no ROM data",
            args.path.display()
        )));
    }

    let importer = Importer::super_famicom(settings, database);
    // Spinner on a terminal, plain log lines when redirected
    let spinner = (!args.quiet && io::stderr().is_terminal()).then(SpinnerProgress::new);
    let progress: &dyn ImportProgress = match &spinner {
        Some(spinner) => spinner,
        None if args.quiet => &SilentProgress,
        None => &LogProgress,
    };
    let result = importer.import_super_famicom_with_firmware(
        &image,
        &args.path,
        args.firmware_dir.as_deref(),
        Some(progress),
    );
    if let Some(spinner) = &spinner {
        spinner.finish();
    }

    let entry = match result {
        Ok(entry) => entry,
        Err(e) => {
            if e.leaves_partial_entry() {
                let target = importer.library_target(&game_title(&args.path));
                log::warn!("Partially written entry left at {}", target.display());
            }
            return Err(e.into());
        }
    };

    log::info!(
        "{} {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        entry.path.display().if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!(
        "  Manifest source: {}",
        entry
            .provenance
            .name()
            .if_supports_color(Stdout, |t| t.cyan()),
    );
    for file in &entry.files {
        if let Some(name) = file.file_name() {
            log::info!("  {}", name.to_string_lossy());
        }
    }
    if let Some(manifest) = &entry.manifest {
        log::info!(
            "  {}",
            manifest
                .display()
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    Ok(())
}
