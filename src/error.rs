//! Error types for translation and the .pex codec

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Translator and codec errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Translation errors
    /// A processor needed more evaluation stack items than were available
    ///
    /// **Triggered by:** malformed source bodies, or a source opcode whose stack
    /// effect was described incorrectly by the input reader
    /// **Lenient mode:** the offending instruction is dropped and translation continues
    #[error("Stack underflow in {method} at IL_{offset:04x}: needed {needed}, had {available}")]
    StackUnderflow {
        /// Method being translated
        method: String,
        /// Source offset of the instruction
        offset: u32,
        /// Items the processor required
        needed: usize,
        /// Items actually on the stack
        available: usize,
    },

    /// An accessor call matched no property of the declaring type
    ///
    /// **Triggered by:** `get_X`/`set_X` on the current type when no property `X`
    /// (or accessor with that name) is declared
    /// **Always fatal** for the method, in both fault policies
    #[error("Invalid property access in {method}: {accessor}")]
    InvalidPropertyAccess {
        /// Method being translated
        method: String,
        /// Accessor name that failed to resolve
        accessor: String,
    },

    /// Malformed input descriptors
    #[error("Invalid source: {0}")]
    InvalidSource(String),

    /// General translation failure
    #[error("Translation error: {0}")]
    Translation(String),

    // Codec errors
    /// A string-table index pointed outside the table
    ///
    /// **Triggered by:** corrupted or truncated .pex files
    /// **Lenient mode:** clamped to the last valid index and the assembly is flagged
    #[error("String table index {index} out of bounds (table size {size})")]
    CorruptedStringTableIndex {
        /// Index read from the file
        index: u16,
        /// Number of strings in the table
        size: usize,
    },

    /// Input ended before a value could be read
    #[error("Unexpected end of data at offset {offset}: need {need} bytes, have {have}")]
    UnexpectedEof {
        /// Read position
        offset: usize,
        /// Bytes requested
        need: usize,
        /// Bytes remaining
        have: usize,
    },

    /// The file does not start with the .pex identifier in either byte order
    #[error("Invalid magic {found:02x?}")]
    InvalidMagic {
        /// First four bytes of the input
        found: [u8; 4],
    },

    /// The caller asked for one generation but the file is the other
    #[error("Generation mismatch: expected {expected}, found {found}")]
    GenerationMismatch {
        /// Requested generation
        expected: String,
        /// Generation detected from the header
        found: String,
    },

    /// Unknown instruction opcode byte
    #[error("Unknown opcode 0x{opcode:02x} at offset {offset}")]
    UnknownOpcode {
        /// Read position
        offset: usize,
        /// Opcode byte
        opcode: u8,
    },

    /// Unknown value-reference kind byte
    #[error("Unknown value kind {kind} at offset {offset}")]
    UnknownValueKind {
        /// Read position
        offset: usize,
        /// Kind byte
        kind: u8,
    },

    /// Inline string was not valid UTF-8
    #[error("Invalid string data at offset {offset}")]
    InvalidString {
        /// Read position
        offset: usize,
    },

    /// A collection is too large for its 16-bit count prefix
    #[error("Too many {what}: {count}")]
    TooManyEntries {
        /// Kind of entry
        what: &'static str,
        /// Actual count
        count: usize,
    },

    /// An instruction's argument count disagrees with its opcode
    #[error("Opcode {opcode} expects {expected} arguments, got {got}")]
    ArityMismatch {
        /// Opcode mnemonic
        opcode: &'static str,
        /// Declared arity
        expected: usize,
        /// Arguments present
        got: usize,
    },
}

/// Caller-selected fault policy
///
/// Strict aborts on the first recoverable fault. Lenient isolates it (drops the
/// instruction, skips the method, or clamps the string index) and continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FaultPolicy {
    Strict,
    #[default]
    Lenient,
}

impl FaultPolicy {
    pub fn is_strict(self) -> bool {
        self == FaultPolicy::Strict
    }
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Aborts regardless of fault policy
    Fatal,
    /// May be isolated under the lenient policy
    Recoverable,
    /// Informational
    Warning,
}

impl Error {
    /// Create a translation error
    pub fn translation(msg: impl Into<String>) -> Self {
        Error::Translation(msg.into())
    }

    /// Create an invalid-source error
    pub fn invalid_source(msg: impl Into<String>) -> Self {
        Error::InvalidSource(msg.into())
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::InvalidPropertyAccess { .. } => ErrorSeverity::Fatal,
            Error::InvalidMagic { .. } => ErrorSeverity::Fatal,
            Error::UnexpectedEof { .. } => ErrorSeverity::Fatal,
            Error::GenerationMismatch { .. } => ErrorSeverity::Fatal,

            Error::StackUnderflow { .. } => ErrorSeverity::Recoverable,
            Error::CorruptedStringTableIndex { .. } => ErrorSeverity::Recoverable,

            Error::TooManyEntries { .. } => ErrorSeverity::Warning,

            _ => ErrorSeverity::Recoverable,
        }
    }

    /// Whether a lenient translation may drop the instruction and continue
    pub fn is_instruction_local(&self) -> bool {
        matches!(self, Error::StackUnderflow { .. })
    }
}

/// Result type for translator and codec operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_access_is_always_fatal() {
        let err = Error::InvalidPropertyAccess {
            method: "Tick".into(),
            accessor: "get_Missing".into(),
        };
        assert_eq!(err.classify(), ErrorSeverity::Fatal);
        assert!(!err.is_instruction_local());
    }

    #[test]
    fn test_underflow_is_recoverable() {
        let err = Error::StackUnderflow {
            method: "Tick".into(),
            offset: 0x12,
            needed: 2,
            available: 1,
        };
        assert_eq!(err.classify(), ErrorSeverity::Recoverable);
        assert!(err.is_instruction_local());
        assert_eq!(
            err.to_string(),
            "Stack underflow in Tick at IL_0012: needed 2, had 1"
        );
    }
}
