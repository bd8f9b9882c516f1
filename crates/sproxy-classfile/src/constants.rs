//! Constant pool
//!
//! Entries are deduplicated on insertion, so adding the same constant twice
//! returns the same index. Indices are 1-based and `long`/`double` entries
//! take two slots, as the VM requires.

use crate::error::ClassFileError;
use crate::writer::{ClassReader, ClassWriter};
use rustc_hash::FxHashMap;

/// Highest usable constant pool index
pub const MAX_ENTRIES: usize = 65534;

/// A constant pool entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Tag 1
    Utf8(String),
    /// Tag 3
    Integer(i32),
    /// Tag 4, stored as raw bits
    Float(u32),
    /// Tag 5, stored as raw bits
    Long(u64),
    /// Tag 6, stored as raw bits
    Double(u64),
    /// Tag 7: index of the internal name
    Class(u16),
    /// Tag 8: index of the contents
    String(u16),
    /// Tag 9
    Fieldref {
        /// Class index
        class: u16,
        /// NameAndType index
        name_and_type: u16,
    },
    /// Tag 10
    Methodref {
        /// Class index
        class: u16,
        /// NameAndType index
        name_and_type: u16,
    },
    /// Tag 11
    InterfaceMethodref {
        /// Class index
        class: u16,
        /// NameAndType index
        name_and_type: u16,
    },
    /// Tag 12
    NameAndType {
        /// Name index
        name: u16,
        /// Descriptor index
        descriptor: u16,
    },
    /// Tag 15
    MethodHandle {
        /// Reference kind (1-9)
        kind: u8,
        /// Referenced member
        reference: u16,
    },
    /// Tag 16: descriptor index
    MethodType(u16),
    /// Tag 18
    InvokeDynamic {
        /// Bootstrap method table index
        bootstrap: u16,
        /// NameAndType index
        name_and_type: u16,
    },
}

impl Constant {
    /// Tag byte
    pub fn tag(&self) -> u8 {
        match self {
            Constant::Utf8(_) => 1,
            Constant::Integer(_) => 3,
            Constant::Float(_) => 4,
            Constant::Long(_) => 5,
            Constant::Double(_) => 6,
            Constant::Class(_) => 7,
            Constant::String(_) => 8,
            Constant::Fieldref { .. } => 9,
            Constant::Methodref { .. } => 10,
            Constant::InterfaceMethodref { .. } => 11,
            Constant::NameAndType { .. } => 12,
            Constant::MethodHandle { .. } => 15,
            Constant::MethodType(_) => 16,
            Constant::InvokeDynamic { .. } => 18,
        }
    }

    /// Number of pool slots the entry occupies
    pub fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }

    fn encode(&self, writer: &mut ClassWriter) -> Result<(), ClassFileError> {
        writer.emit_u8(self.tag());
        match self {
            Constant::Utf8(value) => {
                if !writer.emit_utf8(value) {
                    return Err(ClassFileError::TooLarge {
                        what: "Utf8 constant",
                        len: value.len(),
                    });
                }
            }
            Constant::Integer(value) => writer.emit_u32(*value as u32),
            Constant::Float(bits) => writer.emit_u32(*bits),
            Constant::Long(bits) | Constant::Double(bits) => writer.emit_u64(*bits),
            Constant::Class(index) | Constant::String(index) | Constant::MethodType(index) => {
                writer.emit_u16(*index)
            }
            Constant::Fieldref {
                class,
                name_and_type,
            }
            | Constant::Methodref {
                class,
                name_and_type,
            }
            | Constant::InterfaceMethodref {
                class,
                name_and_type,
            } => {
                writer.emit_u16(*class);
                writer.emit_u16(*name_and_type);
            }
            Constant::NameAndType { name, descriptor } => {
                writer.emit_u16(*name);
                writer.emit_u16(*descriptor);
            }
            Constant::MethodHandle { kind, reference } => {
                writer.emit_u8(*kind);
                writer.emit_u16(*reference);
            }
            Constant::InvokeDynamic {
                bootstrap,
                name_and_type,
            } => {
                writer.emit_u16(*bootstrap);
                writer.emit_u16(*name_and_type);
            }
        }
        Ok(())
    }

    fn decode(reader: &mut ClassReader<'_>) -> Result<Self, ClassFileError> {
        let offset = reader.position();
        let tag = reader.read_u8()?;
        let constant = match tag {
            1 => Constant::Utf8(reader.read_utf8()?),
            3 => Constant::Integer(reader.read_u32()? as i32),
            4 => Constant::Float(reader.read_u32()?),
            5 => Constant::Long(reader.read_u64()?),
            6 => Constant::Double(reader.read_u64()?),
            7 => Constant::Class(reader.read_u16()?),
            8 => Constant::String(reader.read_u16()?),
            9 | 10 | 11 => {
                let class = reader.read_u16()?;
                let name_and_type = reader.read_u16()?;
                match tag {
                    9 => Constant::Fieldref {
                        class,
                        name_and_type,
                    },
                    10 => Constant::Methodref {
                        class,
                        name_and_type,
                    },
                    _ => Constant::InterfaceMethodref {
                        class,
                        name_and_type,
                    },
                }
            }
            12 => Constant::NameAndType {
                name: reader.read_u16()?,
                descriptor: reader.read_u16()?,
            },
            15 => Constant::MethodHandle {
                kind: reader.read_u8()?,
                reference: reader.read_u16()?,
            },
            16 => Constant::MethodType(reader.read_u16()?),
            18 => Constant::InvokeDynamic {
                bootstrap: reader.read_u16()?,
                name_and_type: reader.read_u16()?,
            },
            _ => return Err(ClassFileError::InvalidConstantTag { tag, offset }),
        };
        Ok(constant)
    }
}

/// Deduplicating constant pool
#[derive(Debug, Clone)]
pub struct ConstantPool {
    /// Slot 0 is unused; the second slot of a long/double is `None`
    entries: Vec<Option<Constant>>,
    index: FxHashMap<Constant, u16>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            entries: vec![None],
            index: FxHashMap::default(),
        }
    }

    /// The `constant_pool_count` value: highest index + 1
    pub fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    /// Number of distinct entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the pool has no entries
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Add an entry, returning its index (existing index if already present)
    pub fn add(&mut self, constant: Constant) -> Result<u16, ClassFileError> {
        if let Some(&idx) = self.index.get(&constant) {
            return Ok(idx);
        }
        let width = constant.width();
        if self.entries.len() + width > MAX_ENTRIES + 1 {
            return Err(ClassFileError::PoolOverflow);
        }
        let idx = self.entries.len() as u16;
        self.entries.push(Some(constant.clone()));
        if width == 2 {
            self.entries.push(None);
        }
        self.index.insert(constant, idx);
        Ok(idx)
    }

    /// `Utf8`
    pub fn utf8(&mut self, value: &str) -> Result<u16, ClassFileError> {
        self.add(Constant::Utf8(value.to_string()))
    }

    /// `Class` for an internal name (`java/lang/Object`) or array descriptor
    pub fn class(&mut self, internal_name: &str) -> Result<u16, ClassFileError> {
        let name = self.utf8(internal_name)?;
        self.add(Constant::Class(name))
    }

    /// `String`
    pub fn string(&mut self, value: &str) -> Result<u16, ClassFileError> {
        let utf8 = self.utf8(value)?;
        self.add(Constant::String(utf8))
    }

    /// `Integer`
    pub fn integer(&mut self, value: i32) -> Result<u16, ClassFileError> {
        self.add(Constant::Integer(value))
    }

    /// `NameAndType`
    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> Result<u16, ClassFileError> {
        let name = self.utf8(name)?;
        let descriptor = self.utf8(descriptor)?;
        self.add(Constant::NameAndType { name, descriptor })
    }

    /// `Methodref`
    pub fn methodref(&mut self, class: &str, name: &str, descriptor: &str) -> Result<u16, ClassFileError> {
        let class = self.class(class)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.add(Constant::Methodref {
            class,
            name_and_type,
        })
    }

    /// `InterfaceMethodref`
    pub fn interface_methodref(
        &mut self,
        class: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16, ClassFileError> {
        let class = self.class(class)?;
        let name_and_type = self.name_and_type(name, descriptor)?;
        self.add(Constant::InterfaceMethodref {
            class,
            name_and_type,
        })
    }

    /// Entry at `index`
    pub fn get(&self, index: u16) -> Option<&Constant> {
        self.entries.get(index as usize).and_then(Option::as_ref)
    }

    /// Iterate over `(index, entry)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Constant)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i as u16, c)))
    }

    /// The string of a `Utf8` entry
    pub fn get_utf8(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index) {
            Some(Constant::Utf8(value)) => Ok(value),
            _ => Err(ClassFileError::InvalidConstantRef {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// The internal name of a `Class` entry
    pub fn get_class_name(&self, index: u16) -> Result<&str, ClassFileError> {
        match self.get(index) {
            Some(Constant::Class(name)) => self.get_utf8(*name),
            _ => Err(ClassFileError::InvalidConstantRef {
                index,
                expected: "Class",
            }),
        }
    }

    /// `(class, name, descriptor)` of a `Methodref` or `InterfaceMethodref`
    pub fn get_member_ref(&self, index: u16) -> Result<(&str, &str, &str), ClassFileError> {
        let (class, name_and_type) = match self.get(index) {
            Some(Constant::Methodref {
                class,
                name_and_type,
            })
            | Some(Constant::InterfaceMethodref {
                class,
                name_and_type,
            })
            | Some(Constant::Fieldref {
                class,
                name_and_type,
            }) => (*class, *name_and_type),
            _ => {
                return Err(ClassFileError::InvalidConstantRef {
                    index,
                    expected: "member reference",
                })
            }
        };
        let class = self.get_class_name(class)?;
        match self.get(name_and_type) {
            Some(Constant::NameAndType { name, descriptor }) => {
                Ok((class, self.get_utf8(*name)?, self.get_utf8(*descriptor)?))
            }
            _ => Err(ClassFileError::InvalidConstantRef {
                index: name_and_type,
                expected: "NameAndType",
            }),
        }
    }

    /// Encode `constant_pool_count` followed by the entries
    pub fn encode(&self, writer: &mut ClassWriter) -> Result<(), ClassFileError> {
        writer.emit_u16(self.count());
        for (_, constant) in self.iter() {
            constant.encode(writer)?;
        }
        Ok(())
    }

    /// Decode a pool written by [`ConstantPool::encode`] or any conforming compiler
    pub fn decode(reader: &mut ClassReader<'_>) -> Result<Self, ClassFileError> {
        let count = reader.read_u16()? as usize;
        if count == 0 {
            return Err(ClassFileError::InvalidConstantRef {
                index: 0,
                expected: "constant_pool_count of at least 1",
            });
        }
        let mut pool = Self::new();
        while pool.entries.len() < count {
            let constant = Constant::decode(reader)?;
            let idx = pool.entries.len() as u16;
            let wide = constant.width() == 2;
            // Keep the first index for duplicates found in foreign files.
            pool.index.entry(constant.clone()).or_insert(idx);
            pool.entries.push(Some(constant));
            if wide {
                pool.entries.push(None);
            }
        }
        if pool.entries.len() != count {
            return Err(ClassFileError::InvalidConstantRef {
                index: (count - 1) as u16,
                expected: "single-slot entry at end of pool",
            });
        }
        Ok(pool)
    }
}
