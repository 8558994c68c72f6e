//! Import raw Super Famicom images into the managed game library.
//!
//! This crate owns the whole import pipeline: assembling the raw image,
//! resolving a manifest (release database first, heuristics second),
//! scanning it for ROM declarations, and writing the resulting game folder.

pub mod database;
pub mod error;
pub mod image;
pub mod importer;
pub mod progress;
pub mod resolve;
pub mod scan;
pub mod settings;

pub use database::ReleaseDatabase;
pub use error::{DatabaseError, ImportError, SettingsError};
pub use image::RawImage;
pub use importer::{Importer, LibraryEntry, MANIFEST_FILE, SUPER_FAMICOM_DIR, firmware_source};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
pub use resolve::{HEURISTIC_NOTE, Provenance, ResolvedManifest, game_title};
pub use scan::{RomDeclaration, collect_rom_declarations};
pub use settings::{ImportSettings, load_settings, load_settings_from, save_settings, settings_path};
