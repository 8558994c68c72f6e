//! Flatten the ROM declarations of a manifest tree.

use std::path::{Component, Path};

use cartshelf_core::{Node, NodeKind};

/// A ROM file the library entry must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomDeclaration {
    pub name: String,
    pub size: u64,
}

impl RomDeclaration {
    /// `program.rom` and `data.rom` always come out of the image itself.
    /// Anything else is auxiliary firmware, which lives in the image only
    /// when the manifest says it was appended.
    pub fn is_embedded(&self) -> bool {
        self.name == "program.rom" || self.name == "data.rom"
    }

    /// True when the name is a single file name, so joining it onto a
    /// directory stays inside that directory.
    pub fn is_plain_file_name(&self) -> bool {
        let mut components = Path::new(&self.name).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    }
}

/// Collect every `rom` node under `node` (inclusive), depth-first in
/// document order, however deeply it is nested.
///
/// A missing or unreadable `size` counts as 0.
pub fn collect_rom_declarations(node: &Node) -> Vec<RomDeclaration> {
    let mut roms = Vec::new();
    scan_node(node, &mut roms);
    roms
}

fn scan_node(node: &Node, roms: &mut Vec<RomDeclaration>) {
    if node.kind() == NodeKind::Rom {
        roms.push(RomDeclaration {
            name: node.text_at("name").to_string(),
            size: node.get("size").and_then(Node::decimal).unwrap_or(0),
        });
    }
    for child in node.children() {
        scan_node(child, roms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartshelf_core::markup::{parse, serialize};

    const NESTED: &str = "\
cartridge region=NTSC
  rom name=program.rom size=0x100000
  ram name=save.ram size=0x2000
  sa1
    rom name=sa1.boot.rom size=16
    bus
      rom name=deep.rom size=32
  rom name=data.rom size=1024
";

    fn names(roms: &[RomDeclaration]) -> Vec<&str> {
        roms.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_collects_in_document_order() {
        let doc = parse(NESTED).unwrap();
        let roms = collect_rom_declarations(doc.get("cartridge").unwrap());
        assert_eq!(
            names(&roms),
            vec!["program.rom", "sa1.boot.rom", "deep.rom", "data.rom"]
        );
        assert_eq!(roms[0].size, 0x100000);
        assert_eq!(roms[1].size, 16);
        assert_eq!(roms[3].size, 1024);
    }

    #[test]
    fn test_ram_is_not_collected() {
        let doc = parse(NESTED).unwrap();
        let roms = collect_rom_declarations(&doc);
        assert!(roms.iter().all(|r| r.name != "save.ram"));
    }

    #[test]
    fn test_node_itself_counts() {
        let rom = Node::new("rom")
            .with_attribute("name", "program.rom")
            .with_attribute("size", "32768");
        assert_eq!(
            collect_rom_declarations(&rom),
            vec![RomDeclaration {
                name: "program.rom".to_string(),
                size: 32768,
            }]
        );
    }

    #[test]
    fn test_missing_size_is_zero() {
        let doc = parse("cartridge\n  rom name=odd.rom\n").unwrap();
        assert_eq!(collect_rom_declarations(&doc)[0].size, 0);
    }

    #[test]
    fn test_scan_is_idempotent() {
        let doc = parse(NESTED).unwrap();
        assert_eq!(collect_rom_declarations(&doc), collect_rom_declarations(&doc));
    }

    #[test]
    fn test_scan_survives_serialization() {
        let doc = parse(NESTED).unwrap();
        let reparsed = parse(&serialize(&doc)).unwrap();
        assert_eq!(
            collect_rom_declarations(&doc),
            collect_rom_declarations(&reparsed)
        );
    }

    #[test]
    fn test_embedded_names() {
        let decl = |name: &str| RomDeclaration {
            name: name.to_string(),
            size: 0,
        };
        assert!(decl("program.rom").is_embedded());
        assert!(decl("data.rom").is_embedded());
        assert!(!decl("dsp1.program.rom").is_embedded());
        assert!(!decl("msu1.rom").is_embedded());
    }

    #[test]
    fn test_plain_file_names() {
        let decl = |name: &str| RomDeclaration {
            name: name.to_string(),
            size: 0,
        };
        assert!(decl("program.rom").is_plain_file_name());
        assert!(decl("dsp1.program.rom").is_plain_file_name());
        assert!(!decl("").is_plain_file_name());
        assert!(!decl("..").is_plain_file_name());
        assert!(!decl("../../escaped.rom").is_plain_file_name());
        assert!(!decl("/tmp/escaped.rom").is_plain_file_name());
        assert!(!decl("sub/nested.rom").is_plain_file_name());
        assert!(!decl("./program.rom").is_plain_file_name());
    }
}
