//! Structural class file verification
//!
//! Checks what the emitter is responsible for getting right: constant pool
//! references of the right kind, well-formed descriptors, consistent flags,
//! and straight-line method bodies whose stack and locals fit the declared
//! limits and end in the right return instruction.

use crate::class::{ClassFile, MemberInfo};
use crate::code::return_opcode;
use crate::constants::Constant;
use crate::descriptor::parse_method_descriptor;
use crate::error::ClassFileError;
use crate::flags::*;
use crate::opcode::Opcode;
use crate::writer::ClassReader;
use rustc_hash::FxHashSet;

/// Verification errors
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum VerifyError {
    /// Malformed structure or constant reference
    #[error("{0}")]
    ClassFile(#[from] ClassFileError),

    /// Inconsistent access flags
    #[error("Invalid access flags {flags:#06x} on {what}")]
    InvalidFlags {
        /// Class or method
        what: String,
        /// Flags found
        flags: u16,
    },

    /// Method descriptor does not parse
    #[error("Invalid descriptor {descriptor:?} on method {method}")]
    InvalidDescriptor {
        /// Method name
        method: String,
        /// Descriptor found
        descriptor: String,
    },

    /// Two methods share name and descriptor
    #[error("Duplicate method {name}{descriptor}")]
    DuplicateMethod {
        /// Name
        name: String,
        /// Descriptor
        descriptor: String,
    },

    /// Concrete method without a body
    #[error("Method {0} has no Code attribute")]
    MissingCode(String),

    /// Abstract or native method with a body
    #[error("Method {0} must not have a Code attribute")]
    UnexpectedCode(String),

    /// Byte that is not an opcode this verifier understands
    #[error("Invalid opcode {opcode:#x} at offset {offset} in {method}")]
    InvalidOpcode {
        /// Method key
        method: String,
        /// Byte found
        opcode: u8,
        /// Offset
        offset: usize,
    },

    /// Instruction runs past the end of the code
    #[error("Truncated instruction at offset {offset} in {method}")]
    Truncated {
        /// Method key
        method: String,
        /// Offset
        offset: usize,
    },

    /// Instruction operand names the wrong kind of constant
    #[error("Invalid operand #{index} for {opcode} at offset {offset} in {method}")]
    InvalidOperand {
        /// Method key
        method: String,
        /// Instruction
        opcode: Opcode,
        /// Pool index
        index: u16,
        /// Offset
        offset: usize,
    },

    /// Pops more than the stack holds
    #[error("Stack underflow at offset {offset} in {method}")]
    StackUnderflow {
        /// Method key
        method: String,
        /// Offset
        offset: usize,
    },

    /// Exceeds the declared `max_stack`
    #[error("Stack overflow at offset {offset} in {method} (depth {depth}, max {max})")]
    StackOverflow {
        /// Method key
        method: String,
        /// Offset
        offset: usize,
        /// Depth reached
        depth: u16,
        /// Declared maximum
        max: u16,
    },

    /// Local slot outside `max_locals`
    #[error("Invalid local variable {index} (max {max}) at offset {offset} in {method}")]
    InvalidLocalRef {
        /// Method key
        method: String,
        /// Slot
        index: u16,
        /// Declared `max_locals`
        max: u16,
        /// Offset
        offset: usize,
    },

    /// `max_locals` smaller than the parameters need
    #[error("max_locals {declared} too small for parameters ({needed}) in {method}")]
    LocalsTooSmall {
        /// Method key
        method: String,
        /// Slots needed
        needed: u16,
        /// Slots declared
        declared: u16,
    },

    /// Return instruction does not match the descriptor
    #[error("{opcode} at offset {offset} does not match the return type of {method}")]
    WrongReturn {
        /// Method key
        method: String,
        /// Instruction
        opcode: Opcode,
        /// Offset
        offset: usize,
    },

    /// Code after a return or throw
    #[error("Unreachable code at offset {offset} in {method}")]
    UnreachableCode {
        /// Method key
        method: String,
        /// Offset
        offset: usize,
    },

    /// Execution falls off the end of the code
    #[error("Execution falls off end of {0}")]
    FallOffEnd(String),
}

/// One decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Offset of the opcode (of the `wide` prefix if present)
    pub offset: usize,
    /// Opcode, never `Wide` itself
    pub opcode: Opcode,
    /// Operand value (pool index, local slot or immediate), if any
    pub operand: Option<i32>,
    /// Whether the instruction was `wide`-prefixed
    pub wide: bool,
}

/// Decode straight-line bytecode
pub fn decode_instructions(method: &str, code: &[u8]) -> Result<Vec<Instruction>, VerifyError> {
    let mut reader = ClassReader::new(code);
    let mut out = Vec::new();
    while reader.has_more() {
        let offset = reader.position();
        let truncated = || VerifyError::Truncated {
            method: method.to_string(),
            offset,
        };
        let invalid = |opcode: u8| VerifyError::InvalidOpcode {
            method: method.to_string(),
            opcode,
            offset,
        };

        let byte = reader.read_u8().map_err(|_| truncated())?;
        let mut opcode = Opcode::from_u8(byte).ok_or_else(|| invalid(byte))?;
        let mut wide = false;
        if opcode == Opcode::Wide {
            let next = reader.read_u8().map_err(|_| truncated())?;
            opcode = Opcode::from_u8(next)
                .filter(|op| op.is_local_load())
                .ok_or_else(|| invalid(next))?;
            wide = true;
        }

        let operand = match (opcode.operand_size(), wide) {
            (0, _) => None,
            (_, true) => Some(i32::from(reader.read_u16().map_err(|_| truncated())?)),
            (1, false) => {
                let raw = reader.read_u8().map_err(|_| truncated())?;
                Some(if opcode == Opcode::Bipush {
                    i32::from(raw as i8)
                } else {
                    i32::from(raw)
                })
            }
            (_, false) => {
                if opcode == Opcode::Sipush {
                    Some(i32::from(reader.read_i16().map_err(|_| truncated())?))
                } else {
                    Some(i32::from(reader.read_u16().map_err(|_| truncated())?))
                }
            }
        };

        out.push(Instruction {
            offset,
            opcode,
            operand,
            wide,
        });
    }
    Ok(out)
}

/// Verify a whole class file
pub fn verify_class(class: &ClassFile) -> Result<(), VerifyError> {
    let this_name = class.this_class_name()?.to_string();
    match class.super_class_name()? {
        None if this_name != "java/lang/Object" => {
            return Err(ClassFileError::InvalidConstantRef {
                index: 0,
                expected: "superclass",
            }
            .into())
        }
        _ => {}
    }
    class.interface_names()?;

    let flags = class.access_flags;
    if flags & ACC_FINAL != 0 && flags & ACC_ABSTRACT != 0 {
        return Err(VerifyError::InvalidFlags {
            what: this_name,
            flags,
        });
    }

    let mut seen = FxHashSet::default();
    for method in &class.methods {
        let (name, descriptor) = class.member_signature(method)?;
        if !seen.insert((name, descriptor)) {
            return Err(VerifyError::DuplicateMethod {
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            });
        }
        verify_method(class, method, name, descriptor)?;
    }
    class.source_file()?;
    Ok(())
}

fn verify_method(class: &ClassFile, method: &MemberInfo, name: &str, descriptor: &str) -> Result<(), VerifyError> {
    let key = format!("{}{}", name, descriptor);
    let shape = parse_method_descriptor(descriptor).ok_or_else(|| VerifyError::InvalidDescriptor {
        method: name.to_string(),
        descriptor: descriptor.to_string(),
    })?;

    let flags = method.access_flags;
    let bodiless = flags & (ACC_ABSTRACT | ACC_NATIVE) != 0;
    let abstract_conflict = flags & ACC_ABSTRACT != 0
        && flags & (ACC_FINAL | ACC_PRIVATE | ACC_STATIC | ACC_SYNCHRONIZED | ACC_NATIVE | ACC_STRICT) != 0;
    if visibility_count(flags) > 1 || abstract_conflict {
        return Err(VerifyError::InvalidFlags { what: key, flags });
    }

    class.exceptions_of(method)?;

    let code = class.code_of(method)?;
    let code = match (code, bodiless) {
        (None, true) => return Ok(()),
        (Some(_), true) => return Err(VerifyError::UnexpectedCode(key)),
        (None, false) => return Err(VerifyError::MissingCode(key)),
        (Some(code), false) => code,
    };

    let receiver = u16::from(flags & ACC_STATIC == 0);
    let needed = shape.arg_slots + receiver;
    if code.max_locals < needed {
        return Err(VerifyError::LocalsTooSmall {
            method: key,
            needed,
            declared: code.max_locals,
        });
    }

    for handler in &code.exception_table {
        if handler.catch_type != 0 {
            class.constant_pool.get_class_name(handler.catch_type)?;
        }
    }

    let instructions = decode_instructions(&key, &code.code)?;
    let expected_return = return_opcode(shape.return_kind);
    let mut depth: u16 = 0;

    for (i, instr) in instructions.iter().enumerate() {
        let offset = instr.offset;
        let (pops, pushes) = match instr.opcode.stack_effect() {
            Some(effect) => effect,
            None => invoke_effect(class, &key, instr)?,
        };

        check_operand(class, &key, instr)?;

        let local = instr
            .opcode
            .implicit_local()
            .or_else(|| instr.opcode.is_local_load().then(|| instr.operand.unwrap_or(0) as u16));
        if let Some(slot) = local {
            let size = instr.opcode.stack_effect().map(|(_, p)| p).unwrap_or(1);
            if u32::from(slot) + u32::from(size) > u32::from(code.max_locals) {
                return Err(VerifyError::InvalidLocalRef {
                    method: key,
                    index: slot,
                    max: code.max_locals,
                    offset,
                });
            }
        }

        depth = depth
            .checked_sub(pops)
            .ok_or_else(|| VerifyError::StackUnderflow {
                method: key.clone(),
                offset,
            })?
            + pushes;
        if depth > code.max_stack {
            return Err(VerifyError::StackOverflow {
                method: key,
                offset,
                depth,
                max: code.max_stack,
            });
        }

        if instr.opcode.is_return() && Some(instr.opcode) != expected_return {
            return Err(VerifyError::WrongReturn {
                method: key,
                opcode: instr.opcode,
                offset,
            });
        }
        if instr.opcode.is_terminator() {
            if let Some(next) = instructions.get(i + 1) {
                return Err(VerifyError::UnreachableCode {
                    method: key,
                    offset: next.offset,
                });
            }
        }
    }

    match instructions.last() {
        Some(last) if last.opcode.is_terminator() => Ok(()),
        _ => Err(VerifyError::FallOffEnd(key)),
    }
}

fn invoke_effect(class: &ClassFile, method: &str, instr: &Instruction) -> Result<(u16, u16), VerifyError> {
    let index = instr.operand.unwrap_or(0) as u16;
    let bad = || VerifyError::InvalidOperand {
        method: method.to_string(),
        opcode: instr.opcode,
        index,
        offset: instr.offset,
    };
    let (_, name, descriptor) = class.constant_pool.get_member_ref(index).map_err(|_| bad())?;
    let shape = parse_method_descriptor(descriptor).ok_or_else(bad)?;
    if name == "<init>" && instr.opcode != Opcode::Invokespecial {
        return Err(bad());
    }
    let receiver = u16::from(instr.opcode != Opcode::Invokestatic);
    Ok((shape.arg_slots + receiver, shape.return_slots))
}

fn check_operand(class: &ClassFile, method: &str, instr: &Instruction) -> Result<(), VerifyError> {
    let Some(operand) = instr.operand else {
        return Ok(());
    };
    let index = operand as u16;
    let pool = &class.constant_pool;
    let ok = match instr.opcode {
        Opcode::Ldc | Opcode::LdcW => matches!(
            pool.get(index),
            Some(Constant::Integer(_) | Constant::Float(_) | Constant::String(_) | Constant::Class(_))
        ),
        Opcode::Anewarray | Opcode::Checkcast => pool.get_class_name(index).is_ok(),
        Opcode::Invokevirtual | Opcode::Invokespecial => {
            matches!(pool.get(index), Some(Constant::Methodref { .. }))
        }
        Opcode::Invokestatic => matches!(
            pool.get(index),
            Some(Constant::Methodref { .. } | Constant::InterfaceMethodref { .. })
        ),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(VerifyError::InvalidOperand {
            method: method.to_string(),
            opcode: instr.opcode,
            index,
            offset: instr.offset,
        })
    }
}
