//! String-aware .pex reader

use super::cursor::Cursor;
use crate::assembly::{Endianness, StringTable};
use crate::error::{Error, FaultPolicy, Result};
use tracing::warn;

/// How strings are stored at the current read position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringMode {
    /// u16 index into the string table
    #[default]
    Table,
    /// u16 length followed by UTF-8 bytes
    Inline,
}

/// Cursor plus string table, string mode and fault policy
pub struct PexReader<'a> {
    cursor: Cursor<'a>,
    mode: StringMode,
    table: StringTable,
    policy: FaultPolicy,
    corrupted: bool,
}

impl<'a> PexReader<'a> {
    pub fn new(data: &'a [u8], endian: Endianness, policy: FaultPolicy) -> Self {
        Self {
            cursor: Cursor::new(data, endian),
            mode: StringMode::Table,
            table: StringTable::new(),
            policy,
            corrupted: false,
        }
    }

    pub fn cursor(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    pub fn set_string_mode(&mut self, mode: StringMode) {
        self.mode = mode;
    }

    pub fn set_string_table(&mut self, table: StringTable) {
        self.table = table;
    }

    pub fn string_table(&self) -> &StringTable {
        &self.table
    }

    /// Whether a bad index was clamped during this read
    pub fn is_corrupted(&self) -> bool {
        self.corrupted
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.cursor.read_u8()
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.cursor.read_u16()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.cursor.read_u32()
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.cursor.read_i32()
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.cursor.read_u64()
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.cursor.read_f32()
    }

    /// Read a string in the current mode
    pub fn read_string(&mut self) -> Result<String> {
        match self.mode {
            StringMode::Inline => self.cursor.read_inline_string(),
            StringMode::Table => {
                let index = self.cursor.read_u16()?;
                let index = self.resolve_index(index)?;
                Ok(self.table.get(index).unwrap_or_default().to_string())
            }
        }
    }

    /// Validate a string-table index, clamping it under the lenient policy
    pub fn resolve_index(&mut self, index: u16) -> Result<u16> {
        let size = self.table.len();
        if (index as usize) < size {
            return Ok(index);
        }
        if self.policy.is_strict() || size == 0 {
            return Err(Error::CorruptedStringTableIndex { index, size });
        }
        let clamped = (size - 1) as u16;
        warn!(
            index,
            size,
            clamped,
            offset = self.cursor.position(),
            "string table index out of bounds, clamping"
        );
        self.corrupted = true;
        Ok(clamped)
    }
}
