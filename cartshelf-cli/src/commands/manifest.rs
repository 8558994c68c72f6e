use std::path::Path;

use cartshelf_import::{ImportError, ImportSettings, Importer, RawImage, ReleaseDatabase};

use crate::error::CliError;

/// Print the heuristic manifest for `path` to stdout.
///
/// The output includes the image's sha256, so it can be pasted into a
/// release database as-is.
pub(crate) fn run_manifest(path: &Path) -> Result<(), CliError> {
    let image = RawImage::load(path)?;
    let importer = Importer::super_famicom(ImportSettings::default(), ReleaseDatabase::empty());
    let markup = importer
        .preview_manifest(&image, path)
        .ok_or(ImportError::Parse)?;
    print!("{}", markup);
    Ok(())
}
