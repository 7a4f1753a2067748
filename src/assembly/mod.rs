//! # Papyrus program model
//!
//! In-memory graph of a compiled script container:
//! assembly → types → {fields, properties, states → methods → instructions, structs}.
//!
//! The model is plain data. Behavior is limited to keeping its structural
//! invariants: every instruction is stamped with its owning method when it
//! is inserted, explicit properties store only the accessors they declare,
//! and every type starts with a default state.

pub mod header;
pub mod instruction;
pub mod method;
pub mod opcode;
pub mod string_table;
pub mod types;
pub mod value;
pub mod version;

pub use header::{
    DebugInfo, Header, MethodDescription, MethodType, PropertyGroupDescription,
    StructDescription, PEX_MAGIC,
};
pub use instruction::{Instruction, JumpTarget};
pub use method::{MethodBody, MethodDefinition, ParameterDefinition, VariableDefinition};
pub use opcode::OpCode;
pub use string_table::StringTable;
pub use types::{
    FieldDefinition, PropertyAccessors, PropertyDefinition, StateDefinition, StructDefinition,
    TypeDefinition, UserFlag,
};
pub use value::{Value, ValueKind, VariableReference};
pub use version::{Endianness, VersionTarget};

use serde::{Deserialize, Serialize};

/// A complete compiled container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub target: VersionTarget,
    pub header: Header,
    pub debug_info: Option<DebugInfo>,
    pub user_flags: Vec<UserFlag>,
    pub types: Vec<TypeDefinition>,
    /// Set when a lenient decode clamped a bad string-table index
    pub corrupted: bool,
}

impl Assembly {
    pub fn new(target: VersionTarget, source: impl Into<String>) -> Self {
        Self {
            target,
            header: Header::new(target, source),
            debug_info: None,
            user_flags: Vec::new(),
            types: Vec::new(),
            corrupted: false,
        }
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Total instruction count across every method and accessor
    pub fn instruction_count(&self) -> usize {
        self.types
            .iter()
            .map(|t| {
                let methods: usize = t.methods().map(|m| m.body.len()).sum();
                let accessors: usize = t
                    .properties
                    .iter()
                    .flat_map(|p| p.getter().into_iter().chain(p.setter()))
                    .map(|m| m.body.len())
                    .sum();
                methods + accessors
            })
            .sum()
    }
}
