//! Container header and debug information

use super::version::VersionTarget;
use serde::{Deserialize, Serialize};

/// Identifier at the start of every .pex container
pub const PEX_MAGIC: u32 = 0xFA57_C0DE;

/// Container header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub identifier: u32,
    pub major_version: u8,
    pub minor_version: u8,
    pub game_id: u16,
    /// Seconds since the Unix epoch
    pub compile_time: u64,
    pub source: String,
    pub user: String,
    pub computer: String,
}

impl Header {
    /// Header for `target` stamped with the current time
    pub fn new(target: VersionTarget, source: impl Into<String>) -> Self {
        let (major_version, minor_version) = target.default_version();
        Self {
            identifier: PEX_MAGIC,
            major_version,
            minor_version,
            game_id: target.game_id(),
            compile_time: chrono::Utc::now().timestamp().max(0) as u64,
            source: source.into(),
            user: String::new(),
            computer: String::new(),
        }
    }
}

/// Kind of method a debug description refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MethodType {
    Method = 0,
    Getter = 1,
    Setter = 2,
}

impl MethodType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            1 => MethodType::Getter,
            2 => MethodType::Setter,
            _ => MethodType::Method,
        }
    }
}

/// Source line numbers for one method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescription {
    pub declaring_type: String,
    pub state: String,
    pub name: String,
    pub method_type: MethodType,
    /// One entry per instruction
    pub line_numbers: Vec<u16>,
}

/// Editor property grouping (Fallout 4)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyGroupDescription {
    pub object_name: String,
    pub group_name: String,
    pub documentation: String,
    pub user_flags: u32,
    pub property_names: Vec<String>,
}

/// Struct member ordering (Fallout 4)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDescription {
    pub declaring_type: String,
    pub name: String,
    pub field_names: Vec<String>,
}

/// Optional debug block
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DebugInfo {
    pub modification_time: u64,
    pub methods: Vec<MethodDescription>,
    pub property_groups: Vec<PropertyGroupDescription>,
    pub structs: Vec<StructDescription>,
}
