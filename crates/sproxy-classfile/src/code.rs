//! Method body assembly with operand stack tracking

use crate::class::CodeAttribute;
use crate::constants::ConstantPool;
use crate::descriptor::parse_method_descriptor;
use crate::error::ClassFileError;
use crate::opcode::Opcode;
use crate::writer::ClassWriter;

/// Kind of value held in a local variable slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalKind {
    /// int, boolean, byte, char, short
    Int,
    /// long
    Long,
    /// float
    Float,
    /// double
    Double,
    /// Any reference, including arrays
    Reference,
}

impl LocalKind {
    /// Kind for a field descriptor's first character
    pub fn from_descriptor(kind: char) -> Option<Self> {
        match kind {
            'Z' | 'B' | 'C' | 'S' | 'I' => Some(LocalKind::Int),
            'J' => Some(LocalKind::Long),
            'F' => Some(LocalKind::Float),
            'D' => Some(LocalKind::Double),
            'L' | '[' => Some(LocalKind::Reference),
            _ => None,
        }
    }

    /// Slots used
    pub fn size(self) -> u16 {
        match self {
            LocalKind::Long | LocalKind::Double => 2,
            _ => 1,
        }
    }

    fn load_opcode(self) -> Opcode {
        match self {
            LocalKind::Int => Opcode::Iload,
            LocalKind::Long => Opcode::Lload,
            LocalKind::Float => Opcode::Fload,
            LocalKind::Double => Opcode::Dload,
            LocalKind::Reference => Opcode::Aload,
        }
    }
}

/// Return instruction for a return descriptor's first character
pub fn return_opcode(kind: char) -> Option<Opcode> {
    match kind {
        'V' => Some(Opcode::Return),
        'Z' | 'B' | 'C' | 'S' | 'I' => Some(Opcode::Ireturn),
        'J' => Some(Opcode::Lreturn),
        'F' => Some(Opcode::Freturn),
        'D' => Some(Opcode::Dreturn),
        'L' | '[' => Some(Opcode::Areturn),
        _ => None,
    }
}

/// Straight-line code builder.
///
/// Tracks the operand stack depth after every instruction so `max_stack` is
/// exact; `max_locals` is supplied by the caller from the method signature.
#[derive(Debug)]
pub struct CodeBuilder {
    writer: ClassWriter,
    depth: u16,
    max_stack: u16,
    max_locals: u16,
}

impl CodeBuilder {
    /// Start a body whose parameters (and `this`) occupy `max_locals` slots
    pub fn new(max_locals: u16) -> Self {
        Self {
            writer: ClassWriter::with_capacity(64),
            depth: 0,
            max_stack: 0,
            max_locals,
        }
    }

    /// Current operand stack depth
    pub fn depth(&self) -> u16 {
        self.depth
    }

    fn adjust(&mut self, pops: u16, pushes: u16) {
        self.depth = self.depth.saturating_sub(pops) + pushes;
        self.max_stack = self.max_stack.max(self.depth);
    }

    fn op(&mut self, op: Opcode) {
        self.writer.emit_u8(op.to_u8());
        if let Some((pops, pushes)) = op.stack_effect() {
            self.adjust(pops, pushes);
        }
    }

    /// Push an int with the shortest encoding
    pub fn push_int(&mut self, pool: &mut ConstantPool, value: i32) -> Result<&mut Self, ClassFileError> {
        match value {
            -1 => self.op(Opcode::IconstM1),
            0 => self.op(Opcode::Iconst0),
            1 => self.op(Opcode::Iconst1),
            2 => self.op(Opcode::Iconst2),
            3 => self.op(Opcode::Iconst3),
            4 => self.op(Opcode::Iconst4),
            5 => self.op(Opcode::Iconst5),
            v if i8::try_from(v).is_ok() => {
                self.op(Opcode::Bipush);
                self.writer.emit_u8(v as i8 as u8);
            }
            v if i16::try_from(v).is_ok() => {
                self.op(Opcode::Sipush);
                self.writer.emit_i16(v as i16);
            }
            v => {
                let index = pool.integer(v)?;
                self.ldc(index);
            }
        }
        Ok(self)
    }

    /// `ldc` / `ldc_w` of a single-slot constant
    pub fn ldc(&mut self, index: u16) -> &mut Self {
        match u8::try_from(index) {
            Ok(short) => {
                self.op(Opcode::Ldc);
                self.writer.emit_u8(short);
            }
            Err(_) => {
                self.op(Opcode::LdcW);
                self.writer.emit_u16(index);
            }
        }
        self
    }

    /// Load a local variable
    pub fn load(&mut self, kind: LocalKind, slot: u16) -> &mut Self {
        if kind == LocalKind::Reference && slot <= 3 {
            let op = match slot {
                0 => Opcode::Aload0,
                1 => Opcode::Aload1,
                2 => Opcode::Aload2,
                _ => Opcode::Aload3,
            };
            self.op(op);
            return self;
        }

        let op = kind.load_opcode();
        match u8::try_from(slot) {
            Ok(short) => {
                self.op(op);
                self.writer.emit_u8(short);
            }
            Err(_) => {
                self.op(Opcode::Wide);
                self.op(op);
                self.writer.emit_u16(slot);
            }
        }
        self
    }

    /// `anewarray`
    pub fn anewarray(&mut self, class_index: u16) -> &mut Self {
        self.op(Opcode::Anewarray);
        self.writer.emit_u16(class_index);
        self
    }

    /// `checkcast`
    pub fn checkcast(&mut self, class_index: u16) -> &mut Self {
        self.op(Opcode::Checkcast);
        self.writer.emit_u16(class_index);
        self
    }

    /// `dup`
    pub fn dup(&mut self) -> &mut Self {
        self.op(Opcode::Dup);
        self
    }

    /// `pop`
    pub fn pop(&mut self) -> &mut Self {
        self.op(Opcode::Pop);
        self
    }

    /// `aastore`
    pub fn aastore(&mut self) -> &mut Self {
        self.op(Opcode::Aastore);
        self
    }

    /// An invoke instruction; `descriptor` must match the referenced method
    pub fn invoke(&mut self, op: Opcode, method_index: u16, descriptor: &str) -> Result<&mut Self, ClassFileError> {
        let shape = parse_method_descriptor(descriptor)
            .ok_or_else(|| ClassFileError::InvalidDescriptor(descriptor.to_string()))?;
        let receiver = u16::from(op != Opcode::Invokestatic);
        self.writer.emit_u8(op.to_u8());
        self.writer.emit_u16(method_index);
        self.adjust(shape.arg_slots + receiver, shape.return_slots);
        Ok(self)
    }

    /// Return matching a return descriptor's first character
    pub fn return_value(&mut self, kind: char) -> Result<&mut Self, ClassFileError> {
        let op = return_opcode(kind).ok_or_else(|| ClassFileError::InvalidDescriptor(kind.to_string()))?;
        self.op(op);
        Ok(self)
    }

    /// Finish the body
    pub fn finish(self) -> CodeAttribute {
        CodeAttribute {
            max_stack: self.max_stack,
            max_locals: self.max_locals,
            code: self.writer.into_bytes(),
            exception_table: Vec::new(),
            attributes: Vec::new(),
        }
    }
}
