//! JVM class file container
//!
//! Constant pool management, big-endian encoding and decoding, a small
//! straight-line code assembler and a structural verifier for the classes
//! the proxy emitter produces.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod class;
pub mod code;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod flags;
pub mod opcode;
pub mod verify;
pub mod writer;

pub use class::{digest, Attribute, ClassFile, CodeAttribute, MemberInfo};
pub use code::{CodeBuilder, LocalKind};
pub use constants::{Constant, ConstantPool};
pub use error::ClassFileError;
pub use opcode::Opcode;
pub use verify::{decode_instructions, verify_class, Instruction, VerifyError};
pub use writer::{ClassReader, ClassWriter, DecodeError};
