//! Papyrus opcode table

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Opcodes
// ============================================================================

macro_rules! opcodes {
    ($( $variant:ident = $byte:literal, $mnemonic:literal, $arity:literal, $var:literal; )*) => {
        /// Papyrus VM instruction opcode
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u8)]
        pub enum OpCode {
            $( $variant = $byte, )*
        }

        impl OpCode {
            pub fn from_byte(byte: u8) -> Option<Self> {
                match byte {
                    $( $byte => Some(OpCode::$variant), )*
                    _ => None,
                }
            }

            /// Text-assembly mnemonic
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $( OpCode::$variant => $mnemonic, )*
                }
            }

            /// Number of fixed arguments
            pub fn arity(self) -> usize {
                match self {
                    $( OpCode::$variant => $arity, )*
                }
            }

            /// Whether a count-prefixed variable argument list follows the fixed arguments
            pub fn has_variable_arguments(self) -> bool {
                match self {
                    $( OpCode::$variant => $var, )*
                }
            }
        }
    };
}

opcodes! {
    Nop = 0x00, "nop", 0, false;
    IAdd = 0x01, "iadd", 3, false;
    FAdd = 0x02, "fadd", 3, false;
    ISubtract = 0x03, "isub", 3, false;
    FSubtract = 0x04, "fsub", 3, false;
    IMultiply = 0x05, "imul", 3, false;
    FMultiply = 0x06, "fmul", 3, false;
    IDivide = 0x07, "idiv", 3, false;
    FDivide = 0x08, "fdiv", 3, false;
    IMod = 0x09, "imod", 3, false;
    Not = 0x0A, "not", 2, false;
    INegate = 0x0B, "ineg", 2, false;
    FNegate = 0x0C, "fneg", 2, false;
    Assign = 0x0D, "assign", 2, false;
    Cast = 0x0E, "cast", 2, false;
    CmpEq = 0x0F, "cmp_eq", 3, false;
    CmpLt = 0x10, "cmp_lt", 3, false;
    CmpLte = 0x11, "cmp_le", 3, false;
    CmpGt = 0x12, "cmp_gt", 3, false;
    CmpGte = 0x13, "cmp_ge", 3, false;
    Jmp = 0x14, "jmp", 1, false;
    Jmpt = 0x15, "jmpt", 2, false;
    Jmpf = 0x16, "jmpf", 2, false;
    CallMethod = 0x17, "callmethod", 3, true;
    CallParent = 0x18, "callparent", 2, true;
    CallStatic = 0x19, "callstatic", 3, true;
    Return = 0x1A, "return", 1, false;
    StrCat = 0x1B, "strcat", 3, false;
    PropGet = 0x1C, "propget", 3, false;
    PropSet = 0x1D, "propset", 3, false;
    ArrayCreate = 0x1E, "array_create", 2, false;
    ArrayLength = 0x1F, "array_length", 2, false;
    ArrayGetElement = 0x20, "array_getelement", 3, false;
    ArraySetElement = 0x21, "array_setelement", 3, false;
    ArrayFindElement = 0x22, "array_findelement", 4, false;
    ArrayRFindElement = 0x23, "array_rfindelement", 4, false;
    Is = 0x24, "is", 3, false;
    StructCreate = 0x25, "struct_create", 1, false;
    StructGet = 0x26, "struct_get", 3, false;
    StructSet = 0x27, "struct_set", 3, false;
    ArrayFindStruct = 0x28, "array_findstruct", 5, false;
    ArrayRFindStruct = 0x29, "array_rfindstruct", 5, false;
    ArrayAdd = 0x2A, "array_add", 3, false;
    ArrayInsert = 0x2B, "array_insert", 3, false;
    ArrayRemoveLast = 0x2C, "array_removelast", 1, false;
    ArrayRemove = 0x2D, "array_remove", 3, false;
    ArrayClear = 0x2E, "array_clear", 1, false;
}

impl OpCode {
    pub fn is_jump(self) -> bool {
        matches!(self, OpCode::Jmp | OpCode::Jmpt | OpCode::Jmpf)
    }

    pub fn is_call(self) -> bool {
        matches!(
            self,
            OpCode::CallMethod | OpCode::CallParent | OpCode::CallStatic
        )
    }

    /// Index of the argument holding the relative jump delta
    pub fn jump_argument_index(self) -> Option<usize> {
        match self {
            OpCode::Jmp => Some(0),
            OpCode::Jmpt | OpCode::Jmpf => Some(1),
            _ => None,
        }
    }

    /// Opcodes that only exist on Fallout 4
    pub fn requires_fallout4(self) -> bool {
        (self as u8) >= OpCode::Is as u8
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
