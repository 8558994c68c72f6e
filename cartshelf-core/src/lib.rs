//! Shared building blocks for cartshelf: the BML document model, content
//! hashing, copier-header arithmetic, and the analyzer seam used when a
//! cartridge has no release database entry.

pub mod checksum;
pub mod error;
pub mod markup;
pub mod region;
pub mod util;

pub use checksum::sha256_hex;
pub use error::MarkupError;
pub use markup::{Node, NodeKind};
pub use region::VideoRegion;

/// Layout inferred from a raw cartridge image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicManifest {
    /// BML text of the `cartridge` fragment
    pub markup: String,

    /// Whether coprocessor firmware is physically appended to the image.
    /// When false, firmware ROMs declared by the fragment must be supplied
    /// as separate files.
    pub firmware_appended: bool,
}

/// Trait for inferring a cartridge's layout from its bytes alone.
///
/// Used when no release database record matches the image. Implementors
/// receive the full image, copier header included, and must skip the header
/// themselves if they care about it.
pub trait CartridgeAnalyzer: Send + Sync {
    /// Infer the layout of `data`.
    ///
    /// # Returns
    /// * `Some(HeuristicManifest)` - a non-empty `cartridge` fragment
    /// * `None` - the image is not recognized
    fn analyze(&self, data: &[u8]) -> Option<HeuristicManifest>;

    /// Returns the full name of the platform this analyzer handles.
    fn platform_name(&self) -> &'static str;
}
