use std::path::PathBuf;

use cartshelf_core::MarkupError;
use thiserror::Error;

/// Reasons a library import can fail.
///
/// The display strings are meant to be shown to the user verbatim.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Neither the release database nor the heuristics produced a manifest
    #[error("failed to parse ROM image")]
    Parse,

    /// An external firmware file is missing or has the wrong size.
    /// Raised before anything is written.
    #[error("firmware ({name}) missing or invalid")]
    Firmware { name: String },

    /// A manifest ROM name is not a plain file name (`../x.rom`, `/x.rom`).
    /// Raised before anything is written.
    #[error("invalid ROM name in manifest ({name})")]
    InvalidRomName { name: String },

    /// The source location has no usable file name (`/`, `..` at the root)
    #[error("cannot derive a game title from {}", path.display())]
    Untitled { path: PathBuf },

    /// The library folder could not be created
    #[error("library path unwritable")]
    LibraryUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image ran out of bytes while slicing a ROM declaration.
    /// Files written for earlier declarations are left in place.
    #[error("ROM image is missing data")]
    MissingData {
        name: String,
        needed: u64,
        available: u64,
    },

    /// The resolved manifest text is not valid BML
    #[error("invalid manifest: {0}")]
    Manifest(#[from] MarkupError),

    /// I/O error while reading firmware or writing library files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    pub fn firmware(name: impl Into<String>) -> Self {
        Self::Firmware { name: name.into() }
    }

    /// True when the failure may have left a partially written library entry.
    pub fn leaves_partial_entry(&self) -> bool {
        matches!(self, Self::MissingData { .. } | Self::Io(_))
    }
}

/// Errors loading the release database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed database: {0}")]
    Markup(#[from] MarkupError),
}

/// Errors loading or saving import settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Invalid(String),
}

impl SettingsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
