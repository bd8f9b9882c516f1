//! Class file errors

use crate::writer::DecodeError;
use thiserror::Error;

/// Errors raised while building, encoding or decoding a class file
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClassFileError {
    /// Raw decoding failure
    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    /// File does not start with 0xCAFEBABE
    #[error("Invalid magic number: expected 0xcafebabe, got {0:#x}")]
    InvalidMagic(u32),

    /// Major version outside the supported range
    #[error("Unsupported class file version {major}.{minor}")]
    UnsupportedVersion {
        /// Major version
        major: u16,
        /// Minor version
        minor: u16,
    },

    /// Unknown constant pool tag
    #[error("Invalid constant pool tag {tag} at offset {offset}")]
    InvalidConstantTag {
        /// Tag byte
        tag: u8,
        /// Offset of the tag
        offset: usize,
    },

    /// Index is out of range or names the wrong kind of constant
    #[error("Invalid constant pool reference #{index}: expected {expected}")]
    InvalidConstantRef {
        /// Offending index
        index: u16,
        /// Kind that was expected there
        expected: &'static str,
    },

    /// The constant pool would exceed 65535 entries
    #[error("Constant pool overflow: more than 65535 entries")]
    PoolOverflow,

    /// A length-prefixed structure is too large for its prefix
    #[error("{what} too large: {len}")]
    TooLarge {
        /// Structure name
        what: &'static str,
        /// Actual size
        len: usize,
    },

    /// Malformed field or method descriptor
    #[error("Invalid descriptor {0:?}")]
    InvalidDescriptor(String),

    /// Bytes left over after the last attribute
    #[error("Trailing data: {0} bytes after end of class file")]
    TrailingBytes(usize),
}
