//! Super Famicom library import.
//!
//! Resolves a manifest for a raw image, then lays the image out as a game
//! folder under `<library>/Super Famicom/<title>.sfc/`: one file per ROM
//! declaration, plus `manifest.bml` when enabled.

use std::fs;
use std::path::{Path, PathBuf};

use cartshelf_core::CartridgeAnalyzer;
use cartshelf_nintendo::SnesAnalyzer;

use crate::database::ReleaseDatabase;
use crate::error::ImportError;
use crate::image::RawImage;
use crate::progress::{ImportProgress, SilentProgress};
use crate::resolve::{Provenance, game_title};
use crate::scan::{RomDeclaration, collect_rom_declarations};
use crate::settings::ImportSettings;

/// Library subdirectory holding Super Famicom game folders.
pub const SUPER_FAMICOM_DIR: &str = "Super Famicom";

/// Name of the manifest file written into a game folder.
pub const MANIFEST_FILE: &str = "manifest.bml";

/// Imports raw images into the library.
///
/// Holds everything an import reads: settings, release database and the
/// heuristic analyzer. All three are fixed for the importer's lifetime.
pub struct Importer {
    settings: ImportSettings,
    database: ReleaseDatabase,
    analyzer: Box<dyn CartridgeAnalyzer>,
}

/// A game folder written into the library.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    /// The `<title>.sfc` folder
    pub path: PathBuf,
    /// ROM files written, in declaration order
    pub files: Vec<PathBuf>,
    /// `manifest.bml`, when one was written
    pub manifest: Option<PathBuf>,
    pub provenance: Provenance,
}

impl Importer {
    pub fn new(
        settings: ImportSettings,
        database: ReleaseDatabase,
        analyzer: Box<dyn CartridgeAnalyzer>,
    ) -> Self {
        Self {
            settings,
            database,
            analyzer,
        }
    }

    /// An importer using the built-in Super Famicom header analyzer.
    pub fn super_famicom(settings: ImportSettings, database: ReleaseDatabase) -> Self {
        Self::new(settings, database, Box::new(SnesAnalyzer))
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    pub fn database(&self) -> &ReleaseDatabase {
        &self.database
    }

    pub fn analyzer(&self) -> &dyn CartridgeAnalyzer {
        self.analyzer.as_ref()
    }

    /// `<library>/Super Famicom/<title>.sfc`
    pub fn library_target(&self, title: &str) -> PathBuf {
        self.settings
            .library_path
            .join(SUPER_FAMICOM_DIR)
            .join(format!("{}.sfc", title))
    }

    /// Import `image`, read from `location`, into the library.
    ///
    /// External firmware is looked up next to `location`.
    pub fn import_super_famicom(
        &self,
        image: &RawImage,
        location: &Path,
    ) -> Result<LibraryEntry, ImportError> {
        self.import_super_famicom_with_firmware(image, location, None, None)
    }

    /// Import `image` with an explicit firmware directory and progress sink.
    ///
    /// ROM names and firmware are validated before anything is written, so
    /// a name that is not a plain file name, or a missing or mis-sized
    /// firmware file, leaves the library untouched. A short image fails with
    /// [`ImportError::MissingData`] after the files before the short segment
    /// have already been written; those are not removed.
    pub fn import_super_famicom_with_firmware(
        &self,
        image: &RawImage,
        location: &Path,
        firmware_dir: Option<&Path>,
        progress: Option<&dyn ImportProgress>,
    ) -> Result<LibraryEntry, ImportError> {
        let progress = progress.unwrap_or(&SilentProgress);

        let title = game_title(location);
        if title.is_empty() {
            return Err(ImportError::Untitled {
                path: location.to_path_buf(),
            });
        }

        progress.on_phase("Resolving manifest");
        let manifest = self.resolve_manifest(image, location)?;
        let roms = manifest
            .cartridge()
            .map(collect_rom_declarations)
            .unwrap_or_default();
        log::debug!(
            "manifest from {} declares {} ROM(s)",
            manifest.provenance.name(),
            roms.len()
        );

        // Names come from the database or analyzer and are joined onto the
        // target and firmware directories
        if let Some(rom) = roms.iter().find(|rom| !rom.is_plain_file_name()) {
            log::warn!("refusing ROM name {:?}", rom.name);
            return Err(ImportError::InvalidRomName {
                name: rom.name.clone(),
            });
        }

        let firmware_source = firmware_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| firmware_source(location));
        if !manifest.firmware_appended {
            progress.on_phase("Checking firmware");
            for rom in roms.iter().filter(|rom| !rom.is_embedded()) {
                check_firmware(&firmware_source, rom)?;
            }
        }

        let target = self.library_target(&title);
        fs::create_dir_all(&target).map_err(|source| ImportError::LibraryUnwritable {
            path: target.clone(),
            source,
        })?;

        let mut entry = LibraryEntry {
            path: target.clone(),
            files: Vec::with_capacity(roms.len()),
            manifest: None,
            provenance: manifest.provenance,
        };

        if self.settings.create_manifests {
            let path = target.join(MANIFEST_FILE);
            fs::write(&path, &manifest.markup)?;
            entry.manifest = Some(path);
        }

        progress.on_phase("Writing ROM files");
        let data = image.as_bytes();
        let mut offset = image.header_offset();
        for rom in &roms {
            let path = target.join(&rom.name);
            if rom.is_embedded() || manifest.firmware_appended {
                let available = data.len().saturating_sub(offset);
                let size = usize::try_from(rom.size).unwrap_or(usize::MAX);
                if size > available {
                    return Err(ImportError::MissingData {
                        name: rom.name.clone(),
                        needed: rom.size,
                        available: available as u64,
                    });
                }
                fs::write(&path, &data[offset..offset + size])?;
                offset += size;
            } else {
                fs::copy(firmware_source.join(&rom.name), &path)?;
            }
            progress.on_file(&rom.name, rom.size);
            entry.files.push(path);
        }

        log::info!(
            "Imported {} into {} ({} file(s), manifest from {})",
            title,
            target.display(),
            entry.files.len(),
            manifest.provenance.name()
        );
        progress.on_complete(&format!("Imported {}", title));
        Ok(entry)
    }
}

/// Directory holding external firmware for a source location: the location
/// itself for a game folder, otherwise the directory containing the dump.
pub fn firmware_source(location: &Path) -> PathBuf {
    if location.is_dir() {
        location.to_path_buf()
    } else {
        location
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}

fn check_firmware(dir: &Path, rom: &RomDeclaration) -> Result<(), ImportError> {
    let path = dir.join(&rom.name);
    match fs::metadata(&path) {
        Ok(meta) if meta.is_file() && meta.len() == rom.size => Ok(()),
        Ok(meta) => {
            log::warn!(
                "firmware {} is {} bytes, expected {}",
                path.display(),
                meta.len(),
                rom.size
            );
            Err(ImportError::firmware(&rom.name))
        }
        Err(_) => {
            log::warn!("firmware {} not found", path.display());
            Err(ImportError::firmware(&rom.name))
        }
    }
}
