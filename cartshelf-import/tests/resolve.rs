use std::fs;
use std::path::Path;

use cartshelf_core::markup::parse;
use cartshelf_core::{CartridgeAnalyzer, HeuristicManifest, sha256_hex};
use cartshelf_import::*;

struct FixedAnalyzer(Option<&'static str>);

impl CartridgeAnalyzer for FixedAnalyzer {
    fn analyze(&self, _data: &[u8]) -> Option<HeuristicManifest> {
        self.0.map(|markup| HeuristicManifest {
            markup: markup.to_string(),
            firmware_appended: false,
        })
    }

    fn platform_name(&self) -> &'static str {
        "Test"
    }
}

const HEURISTIC: &str = "cartridge region=PAL\n  rom name=program.rom size=0x8000\n";

fn database_for(digest: &str) -> ReleaseDatabase {
    ReleaseDatabase::parse(&format!(
        "\
release
  cartridge region=NTSC
    board mapping=LoROM
    rom name=program.rom size=0x8000
  information
    title: Database Title
    sha256: {digest}
"
    ))
    .unwrap()
}

fn settings(use_database: bool, use_heuristics: bool) -> ImportSettings {
    ImportSettings {
        use_database,
        use_heuristics,
        ..ImportSettings::default()
    }
}

fn image() -> RawImage {
    RawImage::from_bytes((0..0x8000u32).map(|i| (i % 251) as u8).collect::<Vec<_>>())
}

#[test]
fn database_wins_over_heuristics() {
    let image = image();
    for use_heuristics in [true, false] {
        let importer = Importer::new(
            settings(true, use_heuristics),
            database_for(&image.sha256()),
            Box::new(FixedAnalyzer(Some(HEURISTIC))),
        );
        let manifest = importer
            .resolve_manifest(&image, Path::new("Some Dump.sfc"))
            .unwrap();
        assert_eq!(manifest.provenance, Provenance::Database);
        assert!(manifest.firmware_appended);
        assert_eq!(manifest.title(), "Database Title");
        assert_eq!(manifest.document.text_at("cartridge/region"), "NTSC");
        assert!(!manifest.markup.contains(HEURISTIC_NOTE));
    }
}

#[test]
fn database_digest_covers_copier_header() {
    let mut data = vec![0u8; 512];
    data.extend(image().as_bytes());
    let headered = RawImage::from_bytes(data.clone());
    assert_eq!(headered.sha256(), sha256_hex(&data));

    let importer = Importer::new(
        settings(true, false),
        database_for(&image().sha256()),
        Box::new(FixedAnalyzer(None)),
    );
    assert!(matches!(
        importer.resolve_manifest(&headered, Path::new("x.smc")),
        Err(ImportError::Parse)
    ));
}

#[test]
fn disabled_database_falls_through() {
    let image = image();
    let importer = Importer::new(
        settings(false, true),
        database_for(&image.sha256()),
        Box::new(FixedAnalyzer(Some(HEURISTIC))),
    );
    let manifest = importer
        .resolve_manifest(&image, Path::new("/roms/Dump Name.sfc"))
        .unwrap();
    assert_eq!(manifest.provenance, Provenance::Heuristic);
    assert!(!manifest.firmware_appended);
    assert_eq!(manifest.title(), "Dump Name");
    assert_eq!(
        manifest.document.text_at("information/note"),
        HEURISTIC_NOTE
    );
    assert!(manifest.markup.starts_with(HEURISTIC));
}

#[test]
fn nothing_enabled_is_parse_error() {
    let image = image();
    let importer = Importer::new(
        settings(false, false),
        database_for(&image.sha256()),
        Box::new(FixedAnalyzer(Some(HEURISTIC))),
    );
    assert!(matches!(
        importer.resolve_manifest(&image, Path::new("a.sfc")),
        Err(ImportError::Parse)
    ));
}

#[test]
fn empty_heuristic_fragment_is_parse_error() {
    let importer = Importer::new(
        settings(true, true),
        ReleaseDatabase::empty(),
        Box::new(FixedAnalyzer(Some("  \n"))),
    );
    assert!(matches!(
        importer.resolve_manifest(&image(), Path::new("a.sfc")),
        Err(ImportError::Parse)
    ));
}

#[test]
fn malformed_heuristic_fragment_is_manifest_error() {
    let importer = Importer::new(
        settings(true, true),
        ReleaseDatabase::empty(),
        Box::new(FixedAnalyzer(Some("cartridge\n  rom name=\"unterminated\n"))),
    );
    assert!(matches!(
        importer.resolve_manifest(&image(), Path::new("a.sfc")),
        Err(ImportError::Manifest(_))
    ));
}

#[test]
fn preview_includes_digest() {
    let image = image();
    let importer = Importer::new(
        settings(false, false),
        database_for(&image.sha256()),
        Box::new(FixedAnalyzer(Some(HEURISTIC))),
    );
    let text = importer
        .preview_manifest(&image, Path::new("/roms/Preview.sfc"))
        .unwrap();
    let doc = parse(&text).unwrap();
    assert_eq!(doc.text_at("information/sha256"), image.sha256());
    assert_eq!(doc.text_at("information/title"), "Preview");
    assert_eq!(doc.text_at("cartridge/region"), "PAL");

    let blind = Importer::new(
        settings(true, true),
        ReleaseDatabase::empty(),
        Box::new(FixedAnalyzer(None)),
    );
    assert!(blind.preview_manifest(&image, Path::new("x.sfc")).is_none());
}

/// Database manifests feed the same scan and write path as heuristic ones.
#[test]
fn database_manifest_drives_import() {
    let library = tempfile::tempdir().unwrap();
    let image = image();
    let importer = Importer::new(
        ImportSettings {
            library_path: library.path().to_path_buf(),
            create_manifests: true,
            ..settings(true, true)
        },
        database_for(&image.sha256()),
        Box::new(FixedAnalyzer(None)),
    );

    let entry = importer
        .import_super_famicom(&image, Path::new("/roms/Dump Name.sfc"))
        .unwrap();
    assert_eq!(entry.provenance, Provenance::Database);
    // The folder is named after the source, not the database title
    assert!(entry.path.ends_with("Super Famicom/Dump Name.sfc"));
    assert_eq!(
        fs::read(entry.path.join("program.rom")).unwrap(),
        image.as_bytes()
    );

    let written = fs::read_to_string(entry.manifest.unwrap()).unwrap();
    let doc = parse(&written).unwrap();
    assert_eq!(doc.text_at("information/title"), "Database Title");
    assert_eq!(
        collect_rom_declarations(doc.get("cartridge").unwrap()),
        vec![RomDeclaration {
            name: "program.rom".to_string(),
            size: 0x8000
        }]
    );
}

// ---------------------------------------------------------------------------
// Built-in analyzer
// ---------------------------------------------------------------------------

/// 256 KB LoROM image with a consistent internal header.
fn lorom_image(rom_type: u8, ram_code: u8) -> Vec<u8> {
    let mut rom = vec![0u8; 256 * 1024];
    let base = 0x7FC0;
    rom[base..base + 21].copy_from_slice(b"SHELF TEST           ");
    rom[base + 0x15] = 0x20;
    rom[base + 0x16] = rom_type;
    rom[base + 0x17] = 0x08;
    rom[base + 0x18] = ram_code;
    rom[base + 0x19] = 0x01;
    rom[base + 0x1C..base + 0x1E].copy_from_slice(&(0x4321u16 ^ 0xFFFF).to_le_bytes());
    rom[base + 0x1E..base + 0x20].copy_from_slice(&0x4321u16.to_le_bytes());
    rom[base + 0x3C..base + 0x3E].copy_from_slice(&0x8000u16.to_le_bytes());
    rom
}

#[test]
fn super_famicom_analyzer_end_to_end() {
    let library = tempfile::tempdir().unwrap();
    let data = lorom_image(0x02, 0x03);
    let image = RawImage::from_bytes(data.clone());
    let importer = Importer::super_famicom(
        ImportSettings {
            library_path: library.path().to_path_buf(),
            create_manifests: true,
            ..ImportSettings::default()
        },
        ReleaseDatabase::empty(),
    );

    let entry = importer
        .import_super_famicom(&image, Path::new("/roms/Shelf Test.sfc"))
        .unwrap();

    assert_eq!(entry.provenance, Provenance::Heuristic);
    assert_eq!(fs::read(entry.path.join("program.rom")).unwrap(), data);
    let manifest = parse(&fs::read_to_string(entry.path.join(MANIFEST_FILE)).unwrap()).unwrap();
    assert_eq!(manifest.text_at("cartridge/region"), "NTSC");
    assert_eq!(manifest.text_at("cartridge/board/mapping"), "LoROM");
    assert_eq!(manifest.text_at("information/title"), "Shelf Test");
    let ram = manifest.get("cartridge/ram").unwrap();
    assert_eq!(ram.text_at("name"), "save.ram");
    assert_eq!(ram.get("size").and_then(|n| n.decimal()), Some(8192));
}

#[test]
fn super_famicom_analyzer_rejects_noise() {
    let library = tempfile::tempdir().unwrap();
    let importer = Importer::super_famicom(
        ImportSettings {
            library_path: library.path().to_path_buf(),
            ..ImportSettings::default()
        },
        ReleaseDatabase::empty(),
    );
    let tiny = RawImage::from_bytes(vec![0u8; 1024]);
    assert!(matches!(
        importer.import_super_famicom(&tiny, Path::new("tiny.sfc")),
        Err(ImportError::Parse)
    ));
    assert!(!library.path().join("Super Famicom").exists());
}
