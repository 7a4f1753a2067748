//! # Binary codec
//!
//! Symmetric reader and writer for the .pex container.
//!
//! Layout: header → string table → debug flag → optional debug block →
//! user flags → types (structs, fields, properties, states → methods →
//! instructions). Skyrim containers are big-endian and Fallout 4 containers
//! little-endian; struct sections, property groups and const flags exist only
//! on Fallout 4.

pub mod cursor;
pub mod decode;
pub mod encode;
pub mod reader;

pub use decode::{detect_target, AssemblyReader};
pub use encode::AssemblyWriter;
pub use reader::{PexReader, StringMode};

use crate::assembly::{Assembly, VersionTarget};
use crate::error::{FaultPolicy, Result};

/// Decoder configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    /// Expected generation; `None` detects it from the identifier's byte order
    pub target: Option<VersionTarget>,
    pub fault_policy: FaultPolicy,
}

/// Encode an assembly for its own target generation
pub fn encode(assembly: &Assembly) -> Result<Vec<u8>> {
    AssemblyWriter::new(assembly.target).write(assembly)
}

/// Decode a container with the given options
pub fn decode(data: &[u8], options: DecodeOptions) -> Result<Assembly> {
    AssemblyReader::new(options).read(data)
}
