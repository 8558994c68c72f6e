//! Import settings (library path, resolution switches, manifest output).
//!
//! Stored in the `[import]` table of `~/.config/cartshelf/settings.toml`.
//! Settings are read once and handed to the importer; nothing reads them
//! from global state during an import.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Switches controlling manifest resolution and library output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Root of the managed library; games land in `<root>/Super Famicom/`
    pub library_path: PathBuf,

    /// Look the image up in the release database first
    pub use_database: bool,

    /// Fall back to heuristic analysis when the database has no match
    pub use_heuristics: bool,

    /// Write `manifest.bml` into each library entry
    pub create_manifests: bool,

    /// Release database file, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            use_database: true,
            use_heuristics: true,
            create_manifests: false,
            database_path: None,
        }
    }
}

/// `~/Emulation`, or `./Emulation` when the home directory is unknown.
pub fn default_library_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Emulation")
}

/// Canonical path to the settings file: `~/.config/cartshelf/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("cartshelf").join("settings.toml")
}

/// Resolve the library root using a priority chain:
///
/// 1. CLI override (if `Some`)
/// 2. `library_path` from the settings
pub fn resolve_library_path(cli_override: Option<PathBuf>, settings: &ImportSettings) -> PathBuf {
    cli_override.unwrap_or_else(|| settings.library_path.clone())
}

/// Parse settings from TOML text. A missing `[import]` table yields defaults.
pub fn parse_settings(contents: &str) -> Result<ImportSettings, SettingsError> {
    let doc: toml::Value = contents.parse()?;
    match doc.get("import") {
        Some(table @ toml::Value::Table(_)) => Ok(table.clone().try_into()?),
        Some(_) => Err(SettingsError::invalid("[import] is not a table")),
        None => Ok(ImportSettings::default()),
    }
}

/// Load settings from `path`. A missing file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<ImportSettings, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_settings(&contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("No settings file at {}, using defaults", path.display());
            Ok(ImportSettings::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Load settings from the canonical settings file.
pub fn load_settings() -> Result<ImportSettings, SettingsError> {
    load_settings_from(&settings_path())
}

/// Save settings to `path`.
///
/// Only the `[import]` table is replaced, so other tables in the same file
/// are preserved.
pub fn save_settings_to(path: &Path, settings: &ImportSettings) -> Result<(), SettingsError> {
    let mut doc: toml::Value = match std::fs::read_to_string(path) {
        Ok(contents) => contents.parse().unwrap_or_else(|e| {
            log::warn!("Replacing unreadable settings file {}: {}", path.display(), e);
            toml::Value::Table(Default::default())
        }),
        Err(_) => toml::Value::Table(Default::default()),
    };

    let table = doc
        .as_table_mut()
        .ok_or_else(|| SettingsError::invalid("settings.toml root is not a table"))?;
    table.insert("import".to_string(), toml::Value::try_from(settings)?);

    // Write atomically
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(&doc)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized)?;
    std::fs::rename(&tmp, path)?;

    Ok(())
}

/// Save settings to the canonical settings file.
pub fn save_settings(settings: &ImportSettings) -> Result<(), SettingsError> {
    save_settings_to(&settings_path(), settings)
}
