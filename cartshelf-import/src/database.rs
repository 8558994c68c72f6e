//! Release database of known cartridges.
//!
//! The database is a BML document of `release` records:
//!
//! ```text
//! release
//!   cartridge region=NTSC
//!     rom name=program.rom size=0x80000
//!   information
//!     title: Super Mario World
//!     sha256: 0838e531fe22c077528febe14cb3ff7c492f1f5fa8de354192bdff7137c27f5b
//! ```
//!
//! It is read-only once loaded. Lookups scan records in file order and the
//! first record with a matching digest wins.

use std::path::Path;

use cartshelf_core::markup::{self, Node, NodeKind};

use crate::error::DatabaseError;

/// Known cartridge releases keyed by content hash.
#[derive(Debug, Clone, Default)]
pub struct ReleaseDatabase {
    releases: Vec<Node>,
}

impl ReleaseDatabase {
    /// A database with no records; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse database text. Top-level nodes other than `release` are ignored.
    pub fn parse(text: &str) -> Result<Self, DatabaseError> {
        let document = markup::parse(text)?;
        let mut releases = Vec::new();
        let mut skipped = 0usize;
        for node in document.into_children() {
            if node.kind() == NodeKind::Release {
                releases.push(node);
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            log::warn!("Skipped {} non-release entries in release database", skipped);
        }
        Ok(Self { releases })
    }

    pub fn load(path: &Path) -> Result<Self, DatabaseError> {
        let text = std::fs::read_to_string(path)?;
        let db = Self::parse(&text)?;
        log::debug!("Loaded {} releases from {}", db.len(), path.display());
        Ok(db)
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn releases(&self) -> impl Iterator<Item = &Node> {
        self.releases.iter()
    }

    /// First release whose `information/sha256` equals `digest`.
    pub fn find_by_sha256(&self, digest: &str) -> Option<&Node> {
        self.releases
            .iter()
            .find(|release| release.text_at("information/sha256") == digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DB: &str = "\
// Super Famicom releases
database revision=2016-01-01

release
  cartridge region=NTSC
    rom name=program.rom size=0x8000
  information
    title: First
    sha256: aaaa

release
  cartridge region=PAL
    rom name=program.rom size=0x10000
  information
    title: Second
    sha256: bbbb

release
  cartridge region=NTSC
  information
    title: Duplicate
    sha256: aaaa
";

    #[test]
    fn test_parse_keeps_only_releases() {
        let db = ReleaseDatabase::parse(SAMPLE_DB).unwrap();
        assert_eq!(db.len(), 3);
        assert!(db.releases().all(|r| r.kind() == NodeKind::Release));
    }

    #[test]
    fn test_find_first_match_wins() {
        let db = ReleaseDatabase::parse(SAMPLE_DB).unwrap();
        let release = db.find_by_sha256("aaaa").unwrap();
        assert_eq!(release.text_at("information/title"), "First");
    }

    #[test]
    fn test_find_second_record() {
        let db = ReleaseDatabase::parse(SAMPLE_DB).unwrap();
        let release = db.find_by_sha256("bbbb").unwrap();
        assert_eq!(release.text_at("cartridge/region"), "PAL");
    }

    #[test]
    fn test_find_miss() {
        let db = ReleaseDatabase::parse(SAMPLE_DB).unwrap();
        assert!(db.find_by_sha256("cccc").is_none());
        assert!(ReleaseDatabase::empty().find_by_sha256("aaaa").is_none());
    }

    #[test]
    fn test_malformed_database() {
        assert!(matches!(
            ReleaseDatabase::parse("release\n  \"broken\n"),
            Err(DatabaseError::Markup(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ReleaseDatabase::load(&dir.path().join("missing.bml"));
        assert!(matches!(result, Err(DatabaseError::Io(_))));
    }
}
