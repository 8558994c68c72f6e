//! Manifest resolution: release database first, heuristics second.

use std::path::Path;

use cartshelf_core::markup::{self, Node};

use crate::error::ImportError;
use crate::image::RawImage;
use crate::importer::Importer;

/// Note attached to manifests that were inferred rather than looked up.
pub const HEURISTIC_NOTE: &str = "heuristically generated by cartshelf";

/// Where a manifest came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Exact content match in the release database
    Database,
    /// Inferred by the cartridge analyzer
    Heuristic,
}

impl Provenance {
    pub fn name(self) -> &'static str {
        match self {
            Provenance::Database => "database",
            Provenance::Heuristic => "heuristics",
        }
    }
}

/// A manifest ready to drive an import.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    /// Manifest text, written verbatim as `manifest.bml`
    pub markup: String,
    /// Parsed form of `markup`
    pub document: Node,
    /// Whether auxiliary ROMs are sliced out of the image (true) or copied
    /// from external firmware files (false)
    pub firmware_appended: bool,
    pub provenance: Provenance,
}

impl ResolvedManifest {
    fn new(markup: String, firmware_appended: bool, provenance: Provenance) -> Result<Self, ImportError> {
        let document = markup::parse(&markup)?;
        Ok(Self {
            markup,
            document,
            firmware_appended,
            provenance,
        })
    }

    /// The `cartridge` subtree, if the manifest has one.
    pub fn cartridge(&self) -> Option<&Node> {
        self.document.get("cartridge")
    }

    /// The `information/title` value.
    pub fn title(&self) -> &str {
        self.document.text_at("information/title")
    }
}

/// Game title derived from a source location: the last path component
/// without its extension (`/roms/Pilotwings (USA).sfc` -> `Pilotwings (USA)`).
///
/// Locations without a file name (`.`, `..`) are canonicalized first. Empty
/// when even that yields no name, as for `/`.
pub fn game_title(location: &Path) -> String {
    stem_of(location)
        .or_else(|| {
            location
                .canonicalize()
                .ok()
                .and_then(|path| stem_of(&path))
        })
        .unwrap_or_default()
}

fn stem_of(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

impl Importer {
    /// Resolve the manifest for `image`.
    ///
    /// Tries the release database (when enabled), then the heuristic
    /// analyzer (when enabled). The first one to produce a manifest wins.
    ///
    /// # Returns
    /// * `Ok(ResolvedManifest)` - manifest text, parsed tree and provenance
    /// * `Err(ImportError::Parse)` - no source produced a manifest
    pub fn resolve_manifest(
        &self,
        image: &RawImage,
        location: &Path,
    ) -> Result<ResolvedManifest, ImportError> {
        let settings = self.settings();

        if settings.use_database {
            let digest = image.sha256();
            if let Some(release) = self.database().find_by_sha256(&digest) {
                log::debug!("release database match for {}", digest);
                let mut text = String::new();
                if let Some(cartridge) = release.get("cartridge") {
                    text.push_str(&markup::serialize(cartridge));
                }
                text.push('\n');
                if let Some(information) = release.get("information") {
                    text.push_str(&markup::serialize(information));
                }
                return ResolvedManifest::new(text, true, Provenance::Database);
            }
            log::debug!("no release database match for {}", digest);
        }

        if settings.use_heuristics {
            if let Some(heuristic) = self.analyzer().analyze(image.as_bytes()) {
                if !heuristic.markup.trim().is_empty() {
                    let information = Node::new("information")
                        .with_attribute("title", game_title(location))
                        .with_attribute("note", HEURISTIC_NOTE);
                    let mut text = heuristic.markup;
                    text.push('\n');
                    text.push_str(&markup::serialize(&information));
                    return ResolvedManifest::new(
                        text,
                        heuristic.firmware_appended,
                        Provenance::Heuristic,
                    );
                }
            }
            log::debug!(
                "{} heuristics did not recognize {}",
                self.analyzer().platform_name(),
                location.display()
            );
        }

        Err(ImportError::Parse)
    }

    /// Heuristic manifest for previewing, without touching the library.
    ///
    /// Skips the release database and ignores the resolution switches. The
    /// `information` block also carries the image's `sha256`, so the output
    /// can seed a release database record.
    pub fn preview_manifest(&self, image: &RawImage, location: &Path) -> Option<String> {
        let heuristic = self.analyzer().analyze(image.as_bytes())?;
        if heuristic.markup.trim().is_empty() {
            return None;
        }
        let information = Node::new("information")
            .with_attribute("sha256", image.sha256())
            .with_attribute("title", game_title(location))
            .with_attribute("note", HEURISTIC_NOTE);
        let mut text = heuristic.markup;
        text.push('\n');
        text.push_str(&markup::serialize(&information));
        Some(text)
    }
}
