//! JVM opcodes
//!
//! Only the straight-line subset the proxy emitter produces, plus the loads
//! and returns needed to describe any parameter or return type. There are no
//! branch instructions, so generated code never needs stack map frames.

use std::fmt;

/// Instruction opcode
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Push null
    AconstNull = 0x01,
    /// Push int -1
    IconstM1 = 0x02,
    /// Push int 0
    Iconst0 = 0x03,
    /// Push int 1
    Iconst1 = 0x04,
    /// Push int 2
    Iconst2 = 0x05,
    /// Push int 3
    Iconst3 = 0x06,
    /// Push int 4
    Iconst4 = 0x07,
    /// Push int 5
    Iconst5 = 0x08,
    /// Push sign-extended byte (operand: i8)
    Bipush = 0x10,
    /// Push sign-extended short (operand: i16)
    Sipush = 0x11,
    /// Push constant (operand: u8 pool index)
    Ldc = 0x12,
    /// Push constant (operand: u16 pool index)
    LdcW = 0x13,
    /// Load int local (operand: u8 slot)
    Iload = 0x15,
    /// Load long local (operand: u8 slot)
    Lload = 0x16,
    /// Load float local (operand: u8 slot)
    Fload = 0x17,
    /// Load double local (operand: u8 slot)
    Dload = 0x18,
    /// Load reference local (operand: u8 slot)
    Aload = 0x19,
    /// Load reference from slot 0
    Aload0 = 0x2a,
    /// Load reference from slot 1
    Aload1 = 0x2b,
    /// Load reference from slot 2
    Aload2 = 0x2c,
    /// Load reference from slot 3
    Aload3 = 0x2d,
    /// Store into reference array
    Aastore = 0x53,
    /// Discard top value
    Pop = 0x57,
    /// Discard top two slots
    Pop2 = 0x58,
    /// Duplicate top value
    Dup = 0x59,
    /// Return int
    Ireturn = 0xac,
    /// Return long
    Lreturn = 0xad,
    /// Return float
    Freturn = 0xae,
    /// Return double
    Dreturn = 0xaf,
    /// Return reference
    Areturn = 0xb0,
    /// Return void
    Return = 0xb1,
    /// Invoke instance method (operand: u16 Methodref)
    Invokevirtual = 0xb6,
    /// Invoke constructor or super method (operand: u16 Methodref)
    Invokespecial = 0xb7,
    /// Invoke static method (operand: u16 Methodref)
    Invokestatic = 0xb8,
    /// New reference array (operand: u16 Class)
    Anewarray = 0xbd,
    /// Throw reference
    Athrow = 0xbf,
    /// Checked cast (operand: u16 Class)
    Checkcast = 0xc0,
    /// Widen the next local-variable instruction's index to u16
    Wide = 0xc4,
}

impl Opcode {
    /// Decode an opcode byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        use Opcode::*;
        let op = match byte {
            0x01 => AconstNull,
            0x02 => IconstM1,
            0x03 => Iconst0,
            0x04 => Iconst1,
            0x05 => Iconst2,
            0x06 => Iconst3,
            0x07 => Iconst4,
            0x08 => Iconst5,
            0x10 => Bipush,
            0x11 => Sipush,
            0x12 => Ldc,
            0x13 => LdcW,
            0x15 => Iload,
            0x16 => Lload,
            0x17 => Fload,
            0x18 => Dload,
            0x19 => Aload,
            0x2a => Aload0,
            0x2b => Aload1,
            0x2c => Aload2,
            0x2d => Aload3,
            0x53 => Aastore,
            0x57 => Pop,
            0x58 => Pop2,
            0x59 => Dup,
            0xac => Ireturn,
            0xad => Lreturn,
            0xae => Freturn,
            0xaf => Dreturn,
            0xb0 => Areturn,
            0xb1 => Return,
            0xb6 => Invokevirtual,
            0xb7 => Invokespecial,
            0xb8 => Invokestatic,
            0xbd => Anewarray,
            0xbf => Athrow,
            0xc0 => Checkcast,
            0xc4 => Wide,
            _ => return None,
        };
        Some(op)
    }

    /// Opcode byte
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Operand bytes following the opcode (`wide` is handled by the reader)
    pub fn operand_size(self) -> usize {
        use Opcode::*;
        match self {
            Bipush | Ldc | Iload | Lload | Fload | Dload | Aload => 1,
            Sipush | LdcW | Invokevirtual | Invokespecial | Invokestatic | Anewarray
            | Checkcast => 2,
            _ => 0,
        }
    }

    /// `(pops, pushes)` in slots, or `None` for invocations whose effect
    /// depends on the method descriptor
    pub fn stack_effect(self) -> Option<(u16, u16)> {
        use Opcode::*;
        let effect = match self {
            AconstNull | IconstM1 | Iconst0 | Iconst1 | Iconst2 | Iconst3 | Iconst4 | Iconst5
            | Bipush | Sipush | Ldc | LdcW | Iload | Fload | Aload | Aload0 | Aload1 | Aload2
            | Aload3 => (0, 1),
            Lload | Dload => (0, 2),
            Aastore => (3, 0),
            Pop => (1, 0),
            Pop2 => (2, 0),
            Dup => (1, 2),
            Ireturn | Freturn | Areturn => (1, 0),
            Lreturn | Dreturn => (2, 0),
            Return => (0, 0),
            Anewarray | Checkcast => (1, 1),
            Athrow => (1, 0),
            Wide => (0, 0),
            Invokevirtual | Invokespecial | Invokestatic => return None,
        };
        Some(effect)
    }

    /// Local-variable slot read by the short forms (`aload_0` -> 0)
    pub fn implicit_local(self) -> Option<u16> {
        match self {
            Opcode::Aload0 => Some(0),
            Opcode::Aload1 => Some(1),
            Opcode::Aload2 => Some(2),
            Opcode::Aload3 => Some(3),
            _ => None,
        }
    }

    /// Whether the instruction reads a local through its operand
    pub fn is_local_load(self) -> bool {
        matches!(
            self,
            Opcode::Iload | Opcode::Lload | Opcode::Fload | Opcode::Dload | Opcode::Aload
        )
    }

    /// Whether this is one of the return instructions
    pub fn is_return(self) -> bool {
        matches!(
            self,
            Opcode::Ireturn
                | Opcode::Lreturn
                | Opcode::Freturn
                | Opcode::Dreturn
                | Opcode::Areturn
                | Opcode::Return
        )
    }

    /// Whether control never falls through to the next instruction
    pub fn is_terminator(self) -> bool {
        self.is_return() || self == Opcode::Athrow
    }

    /// Lower-case mnemonic as printed by `javap`
    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            AconstNull => "aconst_null",
            IconstM1 => "iconst_m1",
            Iconst0 => "iconst_0",
            Iconst1 => "iconst_1",
            Iconst2 => "iconst_2",
            Iconst3 => "iconst_3",
            Iconst4 => "iconst_4",
            Iconst5 => "iconst_5",
            Bipush => "bipush",
            Sipush => "sipush",
            Ldc => "ldc",
            LdcW => "ldc_w",
            Iload => "iload",
            Lload => "lload",
            Fload => "fload",
            Dload => "dload",
            Aload => "aload",
            Aload0 => "aload_0",
            Aload1 => "aload_1",
            Aload2 => "aload_2",
            Aload3 => "aload_3",
            Aastore => "aastore",
            Pop => "pop",
            Pop2 => "pop2",
            Dup => "dup",
            Ireturn => "ireturn",
            Lreturn => "lreturn",
            Freturn => "freturn",
            Dreturn => "dreturn",
            Areturn => "areturn",
            Return => "return",
            Invokevirtual => "invokevirtual",
            Invokespecial => "invokespecial",
            Invokestatic => "invokestatic",
            Anewarray => "anewarray",
            Athrow => "athrow",
            Checkcast => "checkcast",
            Wide => "wide",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
