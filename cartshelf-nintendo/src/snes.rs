//! SNES (Super Famicom) cartridge heuristics.
//!
//! Infers a cartridge layout from a raw image when the release database has
//! no entry for it:
//! - Headered (.smc, .swc) and headerless (.sfc) images
//! - LoROM, HiROM and ExHiROM mappings
//! - Coprocessor detection, including firmware that was dumped appended to
//!   the program ROM

use cartshelf_core::markup::{self, Node};
use cartshelf_core::util::{BANK_SIZE, copier_header_size, read_ascii_fixed};
use cartshelf_core::{CartridgeAnalyzer, HeuristicManifest, VideoRegion};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub(crate) const LOROM_HEADER_BASE: usize = 0x7FC0;
pub(crate) const HIROM_HEADER_BASE: usize = 0xFFC0;
pub(crate) const EXHIROM_HEADER_BASE: usize = 0x40FFC0;
const HEADER_LEN: usize = 0x40;

// Offsets relative to the header base
pub(crate) const OFF_TITLE: usize = 0x00;
const TITLE_LEN: usize = 21;
pub(crate) const OFF_MAP_MODE: usize = 0x15;
pub(crate) const OFF_ROM_TYPE: usize = 0x16;
pub(crate) const OFF_ROM_SIZE: usize = 0x17;
pub(crate) const OFF_RAM_SIZE: usize = 0x18;
pub(crate) const OFF_COUNTRY: usize = 0x19;
pub(crate) const OFF_DEVELOPER_ID: usize = 0x1A;
pub(crate) const OFF_COMPLEMENT: usize = 0x1C;
pub(crate) const OFF_CHECKSUM: usize = 0x1E;
pub(crate) const OFF_RESET_VECTOR: usize = 0x3C;

/// Expansion RAM size lives just before the header when the developer ID is
/// 0x33 (extended header).
const EXPANSION_RAM_BACK_OFFSET: usize = 0x03;
const EXTENDED_HEADER_DEVELOPER_ID: u8 = 0x33;

/// Candidates scoring below this are treated as noise.
const MIN_HEADER_SCORE: u32 = 4;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Memory mapping of the cartridge, determined by where the header was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    LoRom,
    HiRom,
    ExHiRom,
}

impl Mapping {
    pub fn name(self) -> &'static str {
        match self {
            Mapping::LoRom => "LoROM",
            Mapping::HiRom => "HiROM",
            Mapping::ExHiRom => "ExHiROM",
        }
    }

    fn header_base(self) -> usize {
        match self {
            Mapping::LoRom => LOROM_HEADER_BASE,
            Mapping::HiRom => HIROM_HEADER_BASE,
            Mapping::ExHiRom => EXHIROM_HEADER_BASE,
        }
    }

    /// Whether a map mode byte is consistent with a header at this location.
    /// The FastROM bit (0x10) is ignored.
    fn accepts_map_mode(self, map_mode: u8) -> bool {
        let mode = map_mode & !0x10;
        match self {
            Mapping::LoRom => matches!(mode, 0x20 | 0x22 | 0x23),
            Mapping::HiRom => matches!(mode, 0x21 | 0x2A),
            Mapping::ExHiRom => mode == 0x25,
        }
    }
}

/// A ROM file a coprocessor needs besides the program ROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firmware {
    pub name: &'static str,
    pub size: usize,
}

const fn firmware(name: &'static str, size: usize) -> Firmware {
    Firmware { name, size }
}

const DSP1_FIRMWARE: &[Firmware] = &[
    firmware("dsp1.program.rom", 0x1800),
    firmware("dsp1.data.rom", 0x800),
];
const DSP2_FIRMWARE: &[Firmware] = &[
    firmware("dsp2.program.rom", 0x1800),
    firmware("dsp2.data.rom", 0x800),
];
const DSP3_FIRMWARE: &[Firmware] = &[
    firmware("dsp3.program.rom", 0x1800),
    firmware("dsp3.data.rom", 0x800),
];
const DSP4_FIRMWARE: &[Firmware] = &[
    firmware("dsp4.program.rom", 0x1800),
    firmware("dsp4.data.rom", 0x800),
];
const ST010_FIRMWARE: &[Firmware] = &[
    firmware("st010.program.rom", 0xC000),
    firmware("st010.data.rom", 0x1000),
];
const ST011_FIRMWARE: &[Firmware] = &[
    firmware("st011.program.rom", 0xC000),
    firmware("st011.data.rom", 0x1000),
];
const CX4_FIRMWARE: &[Firmware] = &[firmware("cx4.data.rom", 0xC00)];

/// Enhancement chips that change how a cartridge must be laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coprocessor {
    SuperFx,
    Sa1,
    Sdd1,
    Cx4,
    Dsp1,
    Dsp2,
    Dsp3,
    Dsp4,
    Obc1,
    St010,
    St011,
}

impl Coprocessor {
    /// Detect the coprocessor from the map mode, chipset and developer bytes.
    pub fn detect(map_mode: u8, rom_type: u8, developer_id: u8, rom_size_code: u8) -> Option<Self> {
        let chip = match (map_mode, rom_type) {
            (0x20, 0x13 | 0x14 | 0x15 | 0x1A) => Self::SuperFx,
            (0x23, 0x32 | 0x34 | 0x35) => Self::Sa1,
            (0x32, 0x43 | 0x45) => Self::Sdd1,
            (0x20, 0xF3) => Self::Cx4,
            (0x20 | 0x21, 0x03) => Self::Dsp1,
            (0x31, 0x03 | 0x05) => Self::Dsp1,
            (0x30, 0x05) if developer_id != 0xB2 => Self::Dsp1,
            (0x30, 0x05) => Self::Dsp3,
            (0x20, 0x05) => Self::Dsp2,
            (0x30, 0x03) => Self::Dsp4,
            (0x30, 0x25) => Self::Obc1,
            (0x30, 0xF6) if rom_size_code >= 10 => Self::St010,
            (0x30, 0xF6) => Self::St011,
            _ => return None,
        };
        Some(chip)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::SuperFx => "SuperFX",
            Self::Sa1 => "SA-1",
            Self::Sdd1 => "S-DD1",
            Self::Cx4 => "Cx4",
            Self::Dsp1 => "DSP-1",
            Self::Dsp2 => "DSP-2",
            Self::Dsp3 => "DSP-3",
            Self::Dsp4 => "DSP-4",
            Self::Obc1 => "OBC-1",
            Self::St010 => "ST010",
            Self::St011 => "ST011",
        }
    }

    /// Firmware ROMs the chip needs, in the order they follow the program
    /// ROM when appended.
    pub fn firmware(self) -> &'static [Firmware] {
        match self {
            Self::Dsp1 => DSP1_FIRMWARE,
            Self::Dsp2 => DSP2_FIRMWARE,
            Self::Dsp3 => DSP3_FIRMWARE,
            Self::Dsp4 => DSP4_FIRMWARE,
            Self::St010 => ST010_FIRMWARE,
            Self::St011 => ST011_FIRMWARE,
            Self::Cx4 => CX4_FIRMWARE,
            Self::SuperFx | Self::Sa1 | Self::Sdd1 | Self::Obc1 => &[],
        }
    }

    pub fn firmware_size(self) -> usize {
        self.firmware().iter().map(|f| f.size).sum()
    }

    fn manifest_node(self) -> Node {
        match self {
            Self::SuperFx => Node::new("superfx"),
            Self::Sa1 => Node::new("sa1").with_child(ram_node("internal.ram", 0x800)),
            Self::Sdd1 => Node::new("sdd1"),
            Self::Obc1 => Node::new("obc1"),
            Self::Cx4 => Node::new("hitachidsp").with_attribute("model", "HG51BS169"),
            Self::Dsp1 | Self::Dsp2 | Self::Dsp3 | Self::Dsp4 => {
                Node::new("necdsp").with_attribute("model", "uPD7725")
            }
            Self::St010 | Self::St011 => Node::new("necdsp").with_attribute("model", "uPD96050"),
        }
    }
}

/// Everything the heuristics derived from an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeLayout {
    /// Internal title from the ROM header
    pub title: String,
    pub mapping: Mapping,
    pub region: VideoRegion,
    /// Bytes skipped at the front of the image (copier header)
    pub header_offset: usize,
    /// Size of `program.rom`, excluding any appended firmware
    pub program_size: usize,
    /// Battery-backed RAM size (0 when the cartridge has none)
    pub ram_size: usize,
    pub coprocessor: Option<Coprocessor>,
    pub firmware_appended: bool,
}

impl CartridgeLayout {
    /// Build the `cartridge` manifest node for this layout.
    ///
    /// ROM declarations appear in the order their bytes are laid out in the
    /// image: program ROM first, then coprocessor firmware.
    pub fn manifest(&self) -> Node {
        let mut cartridge = Node::new("cartridge")
            .with_attribute("region", self.region.name())
            .with_child(Node::new("board").with_attribute("mapping", self.mapping.name()))
            .with_child(rom_node("program.rom", self.program_size));

        if self.ram_size > 0 {
            cartridge.push(ram_node("save.ram", self.ram_size));
        }

        if let Some(chip) = self.coprocessor {
            let mut node = chip.manifest_node();
            for fw in chip.firmware() {
                node.push(rom_node(fw.name, fw.size));
            }
            cartridge.push(node);
        }

        cartridge
    }
}

fn rom_node(name: &str, size: usize) -> Node {
    Node::new("rom")
        .with_attribute("name", name)
        .with_attribute("size", format!("0x{:x}", size))
}

fn ram_node(name: &str, size: usize) -> Node {
    Node::new("ram")
        .with_attribute("name", name)
        .with_attribute("size", format!("0x{:x}", size))
}

// ---------------------------------------------------------------------------
// Header scoring
// ---------------------------------------------------------------------------

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Score how plausible it is that `base` holds the internal header of `rom`
/// (copier header already removed). Returns 0 when the header does not fit.
pub(crate) fn score_header_at(rom: &[u8], base: usize, mapping: Mapping) -> u32 {
    if base + HEADER_LEN > rom.len() {
        return 0;
    }
    let header = &rom[base..base + HEADER_LEN];
    let mut score = 0;

    let checksum = read_u16_le(header, OFF_CHECKSUM);
    let complement = read_u16_le(header, OFF_COMPLEMENT);
    if checksum.wrapping_add(complement) == 0xFFFF {
        score += 4;
    }

    if mapping.accepts_map_mode(header[OFF_MAP_MODE]) {
        score += 2;
    }

    if read_u16_le(header, OFF_RESET_VECTOR) >= 0x8000 {
        score += 2;
    }

    let title = &header[OFF_TITLE..OFF_TITLE + TITLE_LEN];
    if title.iter().all(|b| (0x20..0x7F).contains(b)) {
        score += 1;
    }

    if (0x07..=0x0D).contains(&header[OFF_ROM_SIZE]) {
        score += 1;
    }
    if header[OFF_RAM_SIZE] <= 0x07 {
        score += 1;
    }
    if header[OFF_COUNTRY] <= 0x14 {
        score += 1;
    }

    score
}

/// Pick the most plausible header location. Ties prefer LoROM, then HiROM.
pub(crate) fn detect_mapping(rom: &[u8]) -> Option<Mapping> {
    let mut best: Option<(Mapping, u32)> = None;
    for mapping in [Mapping::LoRom, Mapping::HiRom, Mapping::ExHiRom] {
        let score = score_header_at(rom, mapping.header_base(), mapping);
        log::trace!("{} header score: {}", mapping.name(), score);
        if score >= MIN_HEADER_SCORE && best.is_none_or(|(_, s)| score > s) {
            best = Some((mapping, score));
        }
    }
    best.map(|(mapping, _)| mapping)
}

/// Country codes 0 (Japan), 1 (North America) and 13+ (Korea, Canada,
/// Brazil, ...) are NTSC; the European block in between is PAL.
pub(crate) fn country_to_video_region(country: u8) -> VideoRegion {
    if country <= 1 || country >= 13 {
        VideoRegion::Ntsc
    } else {
        VideoRegion::Pal
    }
}

/// Decode a `1024 << n` size code. Codes above 12 (4 MB) are not real
/// RAM sizes and read as none.
fn decode_ram_size(code: u8) -> usize {
    if code == 0 || code > 12 {
        0
    } else {
        1024 << code
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Infer the layout of a raw image (copier header allowed).
pub fn analyze_layout(data: &[u8]) -> Option<CartridgeLayout> {
    let header_offset = copier_header_size(data.len());
    let rom = &data[header_offset..];
    if rom.len() < BANK_SIZE {
        log::debug!("image too small for a Super Famicom cartridge: {} bytes", rom.len());
        return None;
    }

    let Some(mapping) = detect_mapping(rom) else {
        log::debug!("no plausible Super Famicom header found");
        return None;
    };
    let header = &rom[mapping.header_base()..mapping.header_base() + HEADER_LEN];

    let map_mode = header[OFF_MAP_MODE];
    let rom_type = header[OFF_ROM_TYPE];
    let developer_id = header[OFF_DEVELOPER_ID];
    let coprocessor = Coprocessor::detect(map_mode, rom_type, developer_id, header[OFF_ROM_SIZE]);

    let mut ram_size = decode_ram_size(header[OFF_RAM_SIZE]);
    let expansion_at = mapping.header_base() - EXPANSION_RAM_BACK_OFFSET;
    if ram_size == 0 && developer_id == EXTENDED_HEADER_DEVELOPER_ID {
        ram_size = decode_ram_size(rom[expansion_at]);
    }

    let firmware_size = coprocessor.map_or(0, Coprocessor::firmware_size);
    let firmware_appended = firmware_size > 0
        && rom.len() > firmware_size
        && rom.len() % BANK_SIZE == firmware_size % BANK_SIZE;
    let program_size = if firmware_appended {
        rom.len() - firmware_size
    } else {
        rom.len()
    };

    let layout = CartridgeLayout {
        title: read_ascii_fixed(&header[OFF_TITLE..OFF_TITLE + TITLE_LEN]),
        mapping,
        region: country_to_video_region(header[OFF_COUNTRY]),
        header_offset,
        program_size,
        ram_size,
        coprocessor,
        firmware_appended,
    };
    log::debug!(
        "detected {} cartridge '{}' ({}, coprocessor: {}, firmware appended: {})",
        layout.mapping.name(),
        layout.title,
        layout.region,
        layout.coprocessor.map_or("none", Coprocessor::name),
        layout.firmware_appended,
    );
    Some(layout)
}

/// Heuristic analyzer for SNES/Super Famicom images.
#[derive(Debug, Default)]
pub struct SnesAnalyzer;

impl SnesAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl CartridgeAnalyzer for SnesAnalyzer {
    fn analyze(&self, data: &[u8]) -> Option<HeuristicManifest> {
        let layout = analyze_layout(data)?;
        Some(HeuristicManifest {
            markup: markup::serialize(&layout.manifest()),
            firmware_appended: layout.firmware_appended,
        })
    }

    fn platform_name(&self) -> &'static str {
        "Super Famicom"
    }
}

#[cfg(test)]
#[path = "tests/snes_tests.rs"]
mod tests;
