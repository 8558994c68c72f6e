use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use cartshelf_import::{load_settings_from, settings_path};

use crate::error::CliError;

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Show the effective import settings and where they come from.
pub(crate) fn run_config_show() -> Result<(), CliError> {
    let path = settings_path();
    let settings = load_settings_from(&path)?;

    log::info!(
        "{}",
        "Import Settings".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("");

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    log::info!("");

    log::info!("  library_path:     {}", settings.library_path.display());
    log::info!("  use_database:     {}", on_off(settings.use_database));
    log::info!("  use_heuristics:   {}", on_off(settings.use_heuristics));
    log::info!("  create_manifests: {}", on_off(settings.create_manifests));
    match &settings.database_path {
        Some(db) => log::info!("  database_path:    {}", db.display()),
        None => log::info!(
            "  database_path:    {}",
            "(none)".if_supports_color(Stdout, |t| t.dimmed()),
        ),
    }

    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() {
    log::info!("{}", settings_path().display());
}
