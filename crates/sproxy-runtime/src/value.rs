//! Values crossing the VM / dynamic boundary

use crate::identity::ObjectId;
use sproxy_types::{ClassName, PrimitiveKind};
use std::fmt;

/// Reference to a VM object held by the dynamic side
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// VM identity
    pub id: ObjectId,
    /// Runtime class of the object
    pub class: ClassName,
}

/// A value passed to or returned from a dynamic call.
///
/// Primitives keep their exact VM type; arrays carry no element type and
/// are checked element by element when returned.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null` / `None`
    Null,
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `short`
    Short(i16),
    /// `char` as a UTF-16 code unit
    Char(u16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `java.lang.String`
    Str(String),
    /// Array or list
    Array(Vec<Value>),
    /// Any other VM object
    Object(ObjectRef),
}

impl Value {
    /// Whether this is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Primitive kind of a primitive value
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            Value::Boolean(_) => PrimitiveKind::Boolean,
            Value::Byte(_) => PrimitiveKind::Byte,
            Value::Short(_) => PrimitiveKind::Short,
            Value::Char(_) => PrimitiveKind::Char,
            Value::Int(_) => PrimitiveKind::Int,
            Value::Long(_) => PrimitiveKind::Long,
            Value::Float(_) => PrimitiveKind::Float,
            Value::Double(_) => PrimitiveKind::Double,
            _ => return None,
        })
    }

    /// Type name as the dynamic language reports it
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "NoneType",
            Value::Boolean(_) => "bool",
            Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Long(_) => "int",
            Value::Char(_) | Value::Str(_) => "str",
            Value::Float(_) | Value::Double(_) => "float",
            Value::Array(_) => "list",
            Value::Object(obj) => obj.class.simple_name(),
        }
    }

    /// Integer content of an integral value, widened to `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Byte(v) => Some(i64::from(v)),
            Value::Short(v) => Some(i64::from(v)),
            Value::Char(v) => Some(i64::from(v)),
            Value::Int(v) => Some(i64::from(v)),
            Value::Long(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Char(v) => match char::from_u32(u32::from(*v)) {
                Some(c) => write!(f, "{:?}", c),
                None => write!(f, "\\u{:04x}", v),
            },
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(obj) => write!(f, "{}@{}", obj.class, obj.id),
        }
    }
}
