/// Video standard a cartridge was built for.
///
/// Manifests only distinguish NTSC and PAL; the finer-grained country code
/// from the ROM header is folded into one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoRegion {
    /// 60 Hz (Japan, North America, Korea, Brazil, ...)
    Ntsc,
    /// 50 Hz (Europe, Australia, China, ...)
    Pal,
}

impl VideoRegion {
    /// Returns the value written in a manifest's `region` attribute.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ntsc => "NTSC",
            Self::Pal => "PAL",
        }
    }
}

impl std::fmt::Display for VideoRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
