//! Big-endian class file encoding and decoding utilities

use thiserror::Error;

/// Errors that can occur while reading raw class file bytes
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DecodeError {
    /// Unexpected end of input
    #[error("Unexpected end of class file at offset {0}")]
    UnexpectedEnd(usize),

    /// Invalid modified UTF-8 string
    #[error("Invalid modified UTF-8 string at offset {0}")]
    InvalidUtf8(usize),
}

/// Byte buffer writer
///
/// Class files are big-endian throughout.
#[derive(Debug, Default, Clone)]
pub struct ClassWriter {
    pub(crate) buffer: Vec<u8>,
}

impl ClassWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a writer with capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer and return its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Current offset
    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    /// Emit a raw byte
    pub fn emit_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Emit a 16-bit unsigned integer
    pub fn emit_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit a 16-bit signed integer
    pub fn emit_i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit a 32-bit unsigned integer
    pub fn emit_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit a 64-bit unsigned integer
    pub fn emit_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Emit raw bytes
    pub fn emit_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Overwrite a previously emitted u32 (length back-patching)
    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        self.buffer[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    }

    /// Emit a string in modified UTF-8 with a u16 length prefix.
    ///
    /// Returns `false` without writing anything if the encoding exceeds 65535 bytes.
    pub fn emit_utf8(&mut self, value: &str) -> bool {
        let encoded = encode_modified_utf8(value);
        let Ok(len) = u16::try_from(encoded.len()) else {
            return false;
        };
        self.emit_u16(len);
        self.emit_bytes(&encoded);
        true
    }
}

/// Bounds-checked byte reader
pub struct ClassReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ClassReader<'a> {
    /// Create a reader at offset 0
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Whether unread bytes remain
    pub fn has_more(&self) -> bool {
        self.position < self.buffer.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEnd(self.position));
        }
        let slice = &self.buffer[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    /// Read a 16-bit unsigned integer
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a 16-bit signed integer
    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        let b = self.take(2)?;
        Ok(i16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a 32-bit unsigned integer
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a 64-bit unsigned integer
    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let b = self.take(8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(b);
        Ok(u64::from_be_bytes(bytes))
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, DecodeError> {
        Ok(self.take(len)?.to_vec())
    }

    /// Read a u16-length-prefixed modified UTF-8 string
    pub fn read_utf8(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u16()? as usize;
        let start = self.position;
        let bytes = self.take(len)?;
        decode_modified_utf8(bytes).ok_or(DecodeError::InvalidUtf8(start))
    }
}

/// Encode a string the way class files store it: NUL as two bytes, characters
/// outside the BMP as a surrogate pair of three-byte sequences
pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

/// Inverse of [`encode_modified_utf8`]
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            if b == 0 {
                return None;
            }
            units.push(u16::from(b));
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = *bytes.get(i + 1)?;
            if b2 & 0xC0 != 0x80 {
                return None;
            }
            units.push((u16::from(b & 0x1F) << 6) | u16::from(b2 & 0x3F));
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = *bytes.get(i + 1)?;
            let b3 = *bytes.get(i + 2)?;
            if b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                return None;
            }
            units.push(
                (u16::from(b & 0x0F) << 12) | (u16::from(b2 & 0x3F) << 6) | u16::from(b3 & 0x3F),
            );
            i += 3;
        } else {
            return None;
        }
    }
    String::from_utf16(&units).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian() {
        let mut w = ClassWriter::new();
        w.emit_u32(0xCAFE_BABE);
        w.emit_u16(52);
        w.emit_i16(-2);
        assert_eq!(w.buffer(), &[0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34, 0xFF, 0xFE]);

        let bytes = w.into_bytes();
        let mut r = ClassReader::new(&bytes);
        assert_eq!(r.read_u32().unwrap(), 0xCAFE_BABE);
        assert_eq!(r.read_u16().unwrap(), 52);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert!(!r.has_more());
        assert_eq!(r.read_u8(), Err(DecodeError::UnexpectedEnd(8)));
    }

    #[test]
    fn test_patch() {
        let mut w = ClassWriter::new();
        w.emit_u32(0);
        w.emit_u8(7);
        w.patch_u32(0, 1);
        assert_eq!(w.buffer(), &[0, 0, 0, 1, 7]);
    }

    #[test]
    fn test_modified_utf8() {
        assert_eq!(encode_modified_utf8("a\0b"), vec![b'a', 0xC0, 0x80, b'b']);
        let emoji = "x\u{1F600}";
        let encoded = encode_modified_utf8(emoji);
        assert_eq!(encoded.len(), 1 + 6);
        assert_eq!(decode_modified_utf8(&encoded).as_deref(), Some(emoji));
        assert_eq!(decode_modified_utf8(&[0x00]), None);
        assert_eq!(decode_modified_utf8(&[0xC0]), None);
    }

    #[test]
    fn test_utf8_length_prefix() {
        let mut w = ClassWriter::new();
        assert!(w.emit_utf8("add(I)I"));
        let bytes = w.into_bytes();
        let mut r = ClassReader::new(&bytes);
        assert_eq!(r.read_utf8().unwrap(), "add(I)I");

        let mut w = ClassWriter::new();
        assert!(!w.emit_utf8(&"x".repeat(70_000)));
        assert_eq!(w.offset(), 0);
    }
}
