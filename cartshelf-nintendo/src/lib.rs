//! Nintendo cartridge heuristics.
//!
//! Currently covers the Super Famicom, whose cartridges need real layout
//! inference (mappings, coprocessors, external firmware). The other Nintendo
//! handhelds and consoles import as single ROM blobs and need no analyzer.

pub mod snes;

pub use snes::{CartridgeLayout, Coprocessor, Mapping, SnesAnalyzer};
