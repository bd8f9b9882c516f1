//! Class file structure

use crate::constants::ConstantPool;
use crate::error::ClassFileError;
use crate::writer::{ClassReader, ClassWriter};
use sha2::{Digest, Sha256};

/// Class file magic number
pub const MAGIC: u32 = 0xCAFE_BABE;

/// Default major version (Java 8); generated code needs no stack map frames
pub const DEFAULT_MAJOR_VERSION: u16 = 52;

/// Oldest major version accepted by the decoder (Java 1.1)
pub const MIN_MAJOR_VERSION: u16 = 45;

/// Newest major version accepted by the decoder
pub const MAX_MAJOR_VERSION: u16 = 69;

/// `Code` attribute name
pub const CODE: &str = "Code";
/// `Exceptions` attribute name
pub const EXCEPTIONS: &str = "Exceptions";
/// `SourceFile` attribute name
pub const SOURCE_FILE: &str = "SourceFile";

/// Raw attribute: name index plus uninterpreted body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Utf8 index of the attribute name
    pub name_index: u16,
    /// Attribute body
    pub info: Vec<u8>,
}

impl Attribute {
    fn encode(&self, writer: &mut ClassWriter) -> Result<(), ClassFileError> {
        let len = u32::try_from(self.info.len()).map_err(|_| ClassFileError::TooLarge {
            what: "attribute",
            len: self.info.len(),
        })?;
        writer.emit_u16(self.name_index);
        writer.emit_u32(len);
        writer.emit_bytes(&self.info);
        Ok(())
    }

    fn decode(reader: &mut ClassReader<'_>) -> Result<Self, ClassFileError> {
        let name_index = reader.read_u16()?;
        let len = reader.read_u32()? as usize;
        let info = reader.read_bytes(len)?;
        Ok(Self { name_index, info })
    }
}

fn encode_attributes(attributes: &[Attribute], writer: &mut ClassWriter) -> Result<(), ClassFileError> {
    let count = u16::try_from(attributes.len()).map_err(|_| ClassFileError::TooLarge {
        what: "attribute table",
        len: attributes.len(),
    })?;
    writer.emit_u16(count);
    for attribute in attributes {
        attribute.encode(writer)?;
    }
    Ok(())
}

fn decode_attributes(reader: &mut ClassReader<'_>) -> Result<Vec<Attribute>, ClassFileError> {
    let count = reader.read_u16()?;
    (0..count).map(|_| Attribute::decode(reader)).collect()
}

/// One row of a `Code` attribute's exception table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExceptionHandler {
    /// Start of the protected range
    pub start_pc: u16,
    /// End of the protected range (exclusive)
    pub end_pc: u16,
    /// Handler entry point
    pub handler_pc: u16,
    /// Caught class, 0 for any
    pub catch_type: u16,
}

/// Decoded `Code` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttribute {
    /// Maximum operand stack depth
    pub max_stack: u16,
    /// Local variable slots
    pub max_locals: u16,
    /// Bytecode
    pub code: Vec<u8>,
    /// Exception handlers
    pub exception_table: Vec<ExceptionHandler>,
    /// Nested attributes
    pub attributes: Vec<Attribute>,
}

impl CodeAttribute {
    /// Serialize as the body of a `Code` attribute
    pub fn to_info(&self) -> Result<Vec<u8>, ClassFileError> {
        // The VM caps code length below 64 KiB.
        if self.code.is_empty() || self.code.len() > 65535 {
            return Err(ClassFileError::TooLarge {
                what: "code",
                len: self.code.len(),
            });
        }
        let mut writer = ClassWriter::with_capacity(self.code.len() + 12);
        writer.emit_u16(self.max_stack);
        writer.emit_u16(self.max_locals);
        writer.emit_u32(self.code.len() as u32);
        writer.emit_bytes(&self.code);
        writer.emit_u16(self.exception_table.len() as u16);
        for handler in &self.exception_table {
            writer.emit_u16(handler.start_pc);
            writer.emit_u16(handler.end_pc);
            writer.emit_u16(handler.handler_pc);
            writer.emit_u16(handler.catch_type);
        }
        encode_attributes(&self.attributes, &mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Parse the body of a `Code` attribute
    pub fn from_info(info: &[u8]) -> Result<Self, ClassFileError> {
        let mut reader = ClassReader::new(info);
        let max_stack = reader.read_u16()?;
        let max_locals = reader.read_u16()?;
        let code_len = reader.read_u32()? as usize;
        let code = reader.read_bytes(code_len)?;
        let handlers = reader.read_u16()?;
        let mut exception_table = Vec::with_capacity(handlers as usize);
        for _ in 0..handlers {
            exception_table.push(ExceptionHandler {
                start_pc: reader.read_u16()?,
                end_pc: reader.read_u16()?,
                handler_pc: reader.read_u16()?,
                catch_type: reader.read_u16()?,
            });
        }
        let attributes = decode_attributes(&mut reader)?;
        if reader.has_more() {
            return Err(ClassFileError::TrailingBytes(reader.remaining()));
        }
        Ok(Self {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }
}

/// Serialize the body of an `Exceptions` attribute
pub fn exceptions_info(classes: &[u16]) -> Vec<u8> {
    let mut writer = ClassWriter::with_capacity(2 + classes.len() * 2);
    writer.emit_u16(classes.len() as u16);
    for class in classes {
        writer.emit_u16(*class);
    }
    writer.into_bytes()
}

fn parse_exceptions_info(info: &[u8]) -> Result<Vec<u16>, ClassFileError> {
    let mut reader = ClassReader::new(info);
    let count = reader.read_u16()?;
    (0..count)
        .map(|_| reader.read_u16().map_err(ClassFileError::from))
        .collect()
}

/// A field or method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Access flags
    pub access_flags: u16,
    /// Utf8 index of the name
    pub name_index: u16,
    /// Utf8 index of the descriptor
    pub descriptor_index: u16,
    /// Member attributes
    pub attributes: Vec<Attribute>,
}

impl MemberInfo {
    fn encode(&self, writer: &mut ClassWriter) -> Result<(), ClassFileError> {
        writer.emit_u16(self.access_flags);
        writer.emit_u16(self.name_index);
        writer.emit_u16(self.descriptor_index);
        encode_attributes(&self.attributes, writer)
    }

    fn decode(reader: &mut ClassReader<'_>) -> Result<Self, ClassFileError> {
        Ok(Self {
            access_flags: reader.read_u16()?,
            name_index: reader.read_u16()?,
            descriptor_index: reader.read_u16()?,
            attributes: decode_attributes(reader)?,
        })
    }
}

/// A complete class file
#[derive(Debug, Clone)]
pub struct ClassFile {
    /// Minor version
    pub minor_version: u16,
    /// Major version
    pub major_version: u16,
    /// Constant pool
    pub constant_pool: ConstantPool,
    /// Class access flags
    pub access_flags: u16,
    /// Class index of this class
    pub this_class: u16,
    /// Class index of the superclass (0 only for `java.lang.Object`)
    pub super_class: u16,
    /// Class indices of the interfaces, in order
    pub interfaces: Vec<u16>,
    /// Fields
    pub fields: Vec<MemberInfo>,
    /// Methods
    pub methods: Vec<MemberInfo>,
    /// Class attributes
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Serialize to class file bytes
    pub fn encode(&self) -> Result<Vec<u8>, ClassFileError> {
        let mut writer = ClassWriter::with_capacity(1024);
        writer.emit_u32(MAGIC);
        writer.emit_u16(self.minor_version);
        writer.emit_u16(self.major_version);
        self.constant_pool.encode(&mut writer)?;
        writer.emit_u16(self.access_flags);
        writer.emit_u16(self.this_class);
        writer.emit_u16(self.super_class);

        for (what, len) in [
            ("interface table", self.interfaces.len()),
            ("field table", self.fields.len()),
            ("method table", self.methods.len()),
        ] {
            if len > u16::MAX as usize {
                return Err(ClassFileError::TooLarge { what, len });
            }
        }

        writer.emit_u16(self.interfaces.len() as u16);
        for interface in &self.interfaces {
            writer.emit_u16(*interface);
        }
        writer.emit_u16(self.fields.len() as u16);
        for field in &self.fields {
            field.encode(&mut writer)?;
        }
        writer.emit_u16(self.methods.len() as u16);
        for method in &self.methods {
            method.encode(&mut writer)?;
        }
        encode_attributes(&self.attributes, &mut writer)?;
        Ok(writer.into_bytes())
    }

    /// Parse class file bytes
    pub fn decode(data: &[u8]) -> Result<Self, ClassFileError> {
        let mut reader = ClassReader::new(data);
        let magic = reader.read_u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::InvalidMagic(magic));
        }
        let minor_version = reader.read_u16()?;
        let major_version = reader.read_u16()?;
        if !(MIN_MAJOR_VERSION..=MAX_MAJOR_VERSION).contains(&major_version) {
            return Err(ClassFileError::UnsupportedVersion {
                major: major_version,
                minor: minor_version,
            });
        }

        let constant_pool = ConstantPool::decode(&mut reader)?;
        let access_flags = reader.read_u16()?;
        let this_class = reader.read_u16()?;
        let super_class = reader.read_u16()?;

        let interface_count = reader.read_u16()?;
        let interfaces = (0..interface_count)
            .map(|_| reader.read_u16())
            .collect::<Result<Vec<_>, _>>()?;
        let field_count = reader.read_u16()?;
        let fields = (0..field_count)
            .map(|_| MemberInfo::decode(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;
        let method_count = reader.read_u16()?;
        let methods = (0..method_count)
            .map(|_| MemberInfo::decode(&mut reader))
            .collect::<Result<Vec<_>, _>>()?;
        let attributes = decode_attributes(&mut reader)?;

        if reader.has_more() {
            return Err(ClassFileError::TrailingBytes(reader.remaining()));
        }

        Ok(Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    /// Internal name of this class
    pub fn this_class_name(&self) -> Result<&str, ClassFileError> {
        self.constant_pool.get_class_name(self.this_class)
    }

    /// Internal name of the superclass, `None` for `java.lang.Object` itself
    pub fn super_class_name(&self) -> Result<Option<&str>, ClassFileError> {
        if self.super_class == 0 {
            return Ok(None);
        }
        self.constant_pool.get_class_name(self.super_class).map(Some)
    }

    /// Internal names of the interfaces, in order
    pub fn interface_names(&self) -> Result<Vec<&str>, ClassFileError> {
        self.interfaces
            .iter()
            .map(|i| self.constant_pool.get_class_name(*i))
            .collect()
    }

    /// Name and descriptor of a member
    pub fn member_signature(&self, member: &MemberInfo) -> Result<(&str, &str), ClassFileError> {
        Ok((
            self.constant_pool.get_utf8(member.name_index)?,
            self.constant_pool.get_utf8(member.descriptor_index)?,
        ))
    }

    /// Find a method by name and descriptor
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MemberInfo> {
        self.methods.iter().find(|m| {
            matches!(self.member_signature(m), Ok((n, d)) if n == name && d == descriptor)
        })
    }

    /// Find an attribute by name in a list belonging to this class
    pub fn find_attribute<'a>(&self, attributes: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
        attributes
            .iter()
            .find(|a| self.constant_pool.get_utf8(a.name_index) == Ok(name))
    }

    /// Decoded `Code` attribute of a method, if it has one
    pub fn code_of(&self, method: &MemberInfo) -> Result<Option<CodeAttribute>, ClassFileError> {
        self.find_attribute(&method.attributes, CODE)
            .map(|a| CodeAttribute::from_info(&a.info))
            .transpose()
    }

    /// Internal names listed in a method's `Exceptions` attribute
    pub fn exceptions_of(&self, method: &MemberInfo) -> Result<Vec<&str>, ClassFileError> {
        let Some(attribute) = self.find_attribute(&method.attributes, EXCEPTIONS) else {
            return Ok(Vec::new());
        };
        parse_exceptions_info(&attribute.info)?
            .into_iter()
            .map(|i| self.constant_pool.get_class_name(i))
            .collect()
    }

    /// File name recorded in the `SourceFile` attribute
    pub fn source_file(&self) -> Result<Option<&str>, ClassFileError> {
        let Some(attribute) = self.find_attribute(&self.attributes, SOURCE_FILE) else {
            return Ok(None);
        };
        let mut reader = ClassReader::new(&attribute.info);
        let index = reader.read_u16()?;
        self.constant_pool.get_utf8(index).map(Some)
    }
}

/// Lowercase hex SHA-256 of class file bytes
pub fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
