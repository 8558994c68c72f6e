//! Raw cartridge images as handed to the importer.
//!
//! An image is either a single dump file or the concatenation of the ROM
//! chunks found in a game folder. It may carry a 512-byte copier header,
//! which is hashed and analyzed along with everything else but skipped when
//! ROM segments are sliced out.

use std::fs;
use std::io;
use std::path::Path;

use cartshelf_core::sha256_hex;
use cartshelf_core::util::{copier_header_size, wildcard_match};

/// Chunk files appended after `program.rom` and `data.rom`, in this order.
const FOLDER_CHUNK_PATTERNS: [&str; 3] = ["*.boot.rom", "*.program.rom", "*.data.rom"];

/// An immutable, fully assembled cartridge image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    data: Vec<u8>,
}

impl RawImage {
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    /// Read a single dump file.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        Ok(Self::from_bytes(fs::read(path)?))
    }

    /// Concatenate the ROM chunks of a game folder.
    ///
    /// Order: `program.rom`, `data.rom` (each only if present), then every
    /// `*.boot.rom`, `*.program.rom` and `*.data.rom`, each group sorted by
    /// file name.
    pub fn from_game_folder(dir: &Path) -> io::Result<Self> {
        let mut data = Vec::new();
        append_if_present(&mut data, &dir.join("program.rom"))?;
        append_if_present(&mut data, &dir.join("data.rom"))?;

        let files = list_files(dir, "*.rom")?;
        for pattern in FOLDER_CHUNK_PATTERNS {
            for name in files.iter().filter(|name| wildcard_match(pattern, name)) {
                append_if_present(&mut data, &dir.join(name))?;
            }
        }

        log::debug!(
            "assembled {} bytes from game folder {}",
            data.len(),
            dir.display()
        );
        Ok(Self { data })
    }

    /// Load from a game folder or a dump file, whichever `location` is.
    pub fn load(location: &Path) -> io::Result<Self> {
        if location.is_dir() {
            Self::from_game_folder(location)
        } else {
            Self::from_file(location)
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Where ROM segments start: 512 with a copier header, otherwise 0.
    pub fn header_offset(&self) -> usize {
        copier_header_size(self.data.len())
    }

    /// SHA-256 over the whole image, copier header included.
    pub fn sha256(&self) -> String {
        sha256_hex(&self.data)
    }
}

fn append_if_present(data: &mut Vec<u8>, path: &Path) -> io::Result<()> {
    match fs::read(path) {
        Ok(bytes) => {
            data.extend_from_slice(&bytes);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Names of the regular files in `dir` matching `pattern`, sorted.
fn list_files(dir: &Path, pattern: &str) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if wildcard_match(pattern, name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
