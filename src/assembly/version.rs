//! Target generation selection
//!
//! The two supported container generations differ in byte order, in whether
//! nested struct types and their debug descriptions exist, in the const flags
//! written for types and fields, and in the array index ceiling applied by
//! the store processor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Byte order of multi-byte integers in the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

/// Target game generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VersionTarget {
    /// Skyrim: big-endian, no structs, array indices clamped to 128
    #[default]
    Skyrim,
    /// Fallout 4: little-endian, structs, property groups, const flags
    Fallout4,
}

impl VersionTarget {
    pub fn endianness(self) -> Endianness {
        match self {
            VersionTarget::Skyrim => Endianness::Big,
            VersionTarget::Fallout4 => Endianness::Little,
        }
    }

    /// Nested struct types, struct debug descriptions and struct opcodes
    pub fn supports_structs(self) -> bool {
        self == VersionTarget::Fallout4
    }

    /// Property-group descriptions in the debug block
    pub fn has_property_groups(self) -> bool {
        self == VersionTarget::Fallout4
    }

    /// Const flag byte after type headers and field definitions
    pub fn has_const_flags(self) -> bool {
        self == VersionTarget::Fallout4
    }

    /// Highest literal array index the store processor will emit
    pub fn array_index_ceiling(self) -> Option<i32> {
        match self {
            VersionTarget::Skyrim => Some(128),
            VersionTarget::Fallout4 => None,
        }
    }

    pub fn game_id(self) -> u16 {
        match self {
            VersionTarget::Skyrim => 1,
            VersionTarget::Fallout4 => 2,
        }
    }

    /// Default (major, minor) container version
    pub fn default_version(self) -> (u8, u8) {
        match self {
            VersionTarget::Skyrim => (3, 2),
            VersionTarget::Fallout4 => (3, 9),
        }
    }

    pub fn all() -> [VersionTarget; 2] {
        [VersionTarget::Skyrim, VersionTarget::Fallout4]
    }
}

impl fmt::Display for VersionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionTarget::Skyrim => write!(f, "Skyrim"),
            VersionTarget::Fallout4 => write!(f, "Fallout 4"),
        }
    }
}
