//! Endian-aware byte cursor and writer

use crate::assembly::Endianness;
use crate::error::{Error, Result};

macro_rules! read_int {
    ($name:ident, $ty:ty, $n:literal) => {
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.read_bytes($n)?;
            let mut raw = [0u8; $n];
            raw.copy_from_slice(bytes);
            Ok(match self.endian {
                Endianness::Big => <$ty>::from_be_bytes(raw),
                Endianness::Little => <$ty>::from_le_bytes(raw),
            })
        }
    };
}

macro_rules! write_int {
    ($name:ident, $ty:ty) => {
        pub fn $name(&mut self, v: $ty) {
            match self.endian {
                Endianness::Big => self.buf.extend_from_slice(&v.to_be_bytes()),
                Endianness::Little => self.buf.extend_from_slice(&v.to_le_bytes()),
            }
        }
    };
}

/// Read cursor over a byte slice
#[derive(Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endianness,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8], endian: Endianness) -> Self {
        Self {
            data,
            pos: 0,
            endian,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn set_endianness(&mut self, endian: Endianness) {
        self.endian = endian;
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Four bytes in file order, independent of endianness
    pub fn read_magic(&mut self) -> Result<[u8; 4]> {
        let bytes = self.read_bytes(4)?;
        let mut magic = [0u8; 4];
        magic.copy_from_slice(bytes);
        Ok(magic)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    read_int!(read_u16, u16, 2);
    read_int!(read_i16, i16, 2);
    read_int!(read_u32, u32, 4);
    read_int!(read_i32, i32, 4);
    read_int!(read_u64, u64, 8);
    read_int!(read_f32, f32, 4);

    /// u16 length followed by UTF-8 bytes
    pub fn read_inline_string(&mut self) -> Result<String> {
        let offset = self.pos;
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::InvalidString { offset })
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos + n > self.data.len() {
            return Err(Error::UnexpectedEof {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Writer that builds a byte buffer
pub struct Writer {
    buf: Vec<u8>,
    endian: Endianness,
}

impl Writer {
    pub fn new(endian: Endianness) -> Self {
        Self {
            buf: Vec::new(),
            endian,
        }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    write_int!(write_u16, u16);
    write_int!(write_i16, i16);
    write_int!(write_u32, u32);
    write_int!(write_i32, i32);
    write_int!(write_u64, u64);
    write_int!(write_f32, f32);

    /// Overwrite a previously written u32
    pub fn patch_u32(&mut self, pos: usize, v: u32) {
        let bytes = match self.endian {
            Endianness::Big => v.to_be_bytes(),
            Endianness::Little => v.to_le_bytes(),
        };
        self.buf[pos..pos + 4].copy_from_slice(&bytes);
    }

    /// u16 length followed by UTF-8 bytes
    pub fn write_inline_string(&mut self, s: &str) -> Result<()> {
        let len = u16::try_from(s.len()).map_err(|_| Error::TooManyEntries {
            what: "string bytes",
            count: s.len(),
        })?;
        self.write_u16(len);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_order() {
        let mut big = Writer::new(Endianness::Big);
        big.write_u32(0xFA57_C0DE);
        assert_eq!(big.into_bytes(), vec![0xFA, 0x57, 0xC0, 0xDE]);

        let mut little = Writer::new(Endianness::Little);
        little.write_u32(0xFA57_C0DE);
        let bytes = little.into_bytes();
        assert_eq!(bytes, vec![0xDE, 0xC0, 0x57, 0xFA]);

        let mut cursor = Cursor::new(&bytes, Endianness::Little);
        assert_eq!(cursor.read_u32().unwrap(), 0xFA57_C0DE);
    }

    #[test]
    fn test_eof() {
        let mut cursor = Cursor::new(&[1, 2], Endianness::Big);
        assert_eq!(
            cursor.read_u32(),
            Err(Error::UnexpectedEof {
                offset: 0,
                need: 4,
                have: 2
            })
        );
    }

    #[test]
    fn test_inline_string() {
        let mut writer = Writer::new(Endianness::Big);
        writer.write_inline_string("Actor.psc").unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(&bytes[..2], &[0, 9]);
        let mut cursor = Cursor::new(&bytes, Endianness::Big);
        assert_eq!(cursor.read_inline_string().unwrap(), "Actor.psc");
    }

    #[test]
    fn test_patch() {
        let mut writer = Writer::new(Endianness::Little);
        writer.write_u32(0);
        writer.write_u8(7);
        writer.patch_u32(0, 5);
        assert_eq!(writer.into_bytes(), vec![5, 0, 0, 0, 7]);
    }
}
