//! Core type descriptors for proxy signatures

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Fully-qualified name of the VM root class
pub const OBJECT_CLASS: &str = "java.lang.Object";

/// Primitive kinds understood by the VM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    /// `void` (return position only)
    Void,
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `char`
    Char,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl PrimitiveKind {
    /// Every primitive kind, in keyword order
    pub const ALL: [PrimitiveKind; 9] = [
        PrimitiveKind::Void,
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Char,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Look up a primitive by its source keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.keyword() == keyword)
    }

    /// Source keyword (`int`, `boolean`, ...)
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Single-character VM descriptor
    pub fn descriptor_char(self) -> char {
        match self {
            PrimitiveKind::Void => 'V',
            PrimitiveKind::Boolean => 'Z',
            PrimitiveKind::Byte => 'B',
            PrimitiveKind::Short => 'S',
            PrimitiveKind::Char => 'C',
            PrimitiveKind::Int => 'I',
            PrimitiveKind::Long => 'J',
            PrimitiveKind::Float => 'F',
            PrimitiveKind::Double => 'D',
        }
    }

    /// Number of local-variable / operand-stack slots a value occupies
    pub fn size(self) -> u16 {
        match self {
            PrimitiveKind::Void => 0,
            PrimitiveKind::Long | PrimitiveKind::Double => 2,
            _ => 1,
        }
    }

    /// Wrapper class used when the value crosses the boundary as an object
    pub fn box_class(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "java.lang.Void",
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Char => "java.lang.Character",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
        }
    }

    /// Name of the wrapper's unboxing accessor (`intValue`, ...)
    pub fn unbox_method(self) -> Option<&'static str> {
        match self {
            PrimitiveKind::Void => None,
            PrimitiveKind::Boolean => Some("booleanValue"),
            PrimitiveKind::Byte => Some("byteValue"),
            PrimitiveKind::Short => Some("shortValue"),
            PrimitiveKind::Char => Some("charValue"),
            PrimitiveKind::Int => Some("intValue"),
            PrimitiveKind::Long => Some("longValue"),
            PrimitiveKind::Float => Some("floatValue"),
            PrimitiveKind::Double => Some("doubleValue"),
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Binary name of a VM class: dotted package, `$` between nested classes
/// (`com.example.Outer$Inner`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassName(Arc<str>);

impl ClassName {
    /// Wrap a binary class name
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The VM root class
    pub fn object() -> Self {
        Self::new(OBJECT_CLASS)
    }

    /// Binary name as written
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Internal form used inside class files (`com/example/Outer$Inner`)
    pub fn internal_name(&self) -> String {
        self.0.replace('.', "/")
    }

    /// Source form (`com.example.Outer.Inner`)
    pub fn source_name(&self) -> String {
        self.0.replace('$', ".")
    }

    /// Package part, empty for the default package
    pub fn package(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Last segment of the binary name (`Outer$Inner`)
    pub fn simple_name(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Whether every segment is a non-empty identifier
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self
                .0
                .split(|c| c == '.' || c == '$')
                .all(is_identifier)
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check a single name segment against the VM identifier rules we accept
pub fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Array of a non-array element type with one or more dimensions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    element: Arc<TypeDescriptor>,
    dims: u8,
}

impl ArrayType {
    /// Element type (never itself an array)
    pub fn element(&self) -> &TypeDescriptor {
        &self.element
    }

    /// Number of dimensions (at least 1)
    pub fn dims(&self) -> u8 {
        self.dims
    }

    /// Type of one element of this array (`int[][]` -> `int[]`)
    pub fn component(&self) -> TypeDescriptor {
        if self.dims == 1 {
            (*self.element).clone()
        } else {
            TypeDescriptor::Array(ArrayType {
                element: self.element.clone(),
                dims: self.dims - 1,
            })
        }
    }
}

/// A parameter, return or thrown type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// Primitive type, including `void`
    Primitive(PrimitiveKind),
    /// Class or interface, by binary name
    Reference(ClassName),
    /// Array with collapsed dimensions
    Array(ArrayType),
}

impl TypeDescriptor {
    /// `void`
    pub const VOID: TypeDescriptor = TypeDescriptor::Primitive(PrimitiveKind::Void);

    /// Reference to the named class
    pub fn reference(name: impl Into<Arc<str>>) -> Self {
        TypeDescriptor::Reference(ClassName::new(name))
    }

    /// `java.lang.Object`
    pub fn object() -> Self {
        TypeDescriptor::Reference(ClassName::object())
    }

    /// Wrap `self` in `dims` more array dimensions.
    ///
    /// Total: `dims == 0` returns the input unchanged, arrays of arrays collapse
    /// into one descriptor and the dimension count saturates at the VM limit.
    pub fn array_of(&self, dims: u8) -> TypeDescriptor {
        if dims == 0 {
            return self.clone();
        }
        match self {
            TypeDescriptor::Array(array) => TypeDescriptor::Array(ArrayType {
                element: array.element.clone(),
                dims: array.dims.saturating_add(dims),
            }),
            other => TypeDescriptor::Array(ArrayType {
                element: Arc::new(other.clone()),
                dims,
            }),
        }
    }

    /// Whether this is `void`
    pub fn is_void(&self) -> bool {
        matches!(self, TypeDescriptor::Primitive(PrimitiveKind::Void))
    }

    /// Primitive kind, if any
    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            TypeDescriptor::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Class name, if this is a plain reference
    pub fn as_reference(&self) -> Option<&ClassName> {
        match self {
            TypeDescriptor::Reference(name) => Some(name),
            _ => None,
        }
    }

    /// Array shape, if any
    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            TypeDescriptor::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Slot size: 0 for void, 2 for long/double, 1 for everything else
    pub fn size(&self) -> u16 {
        match self {
            TypeDescriptor::Primitive(kind) => kind.size(),
            _ => 1,
        }
    }

    /// VM field descriptor (`I`, `Ljava/lang/String;`, `[[I`)
    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    /// Append the VM field descriptor to `out`
    pub fn write_descriptor(&self, out: &mut String) {
        match self {
            TypeDescriptor::Primitive(kind) => out.push(kind.descriptor_char()),
            TypeDescriptor::Reference(name) => {
                out.push('L');
                out.push_str(&name.internal_name());
                out.push(';');
            }
            TypeDescriptor::Array(array) => {
                for _ in 0..array.dims {
                    out.push('[');
                }
                array.element.write_descriptor(out);
            }
        }
    }

    /// Name used by `checkcast` and class constants: the internal name for
    /// references, the descriptor for arrays
    pub fn class_constant_name(&self) -> Option<String> {
        match self {
            TypeDescriptor::Primitive(_) => None,
            TypeDescriptor::Reference(name) => Some(name.internal_name()),
            TypeDescriptor::Array(_) => Some(self.descriptor()),
        }
    }

    /// Source-language spelling (`int[][]`, `com.example.Outer.Inner`)
    pub fn source_name(&self) -> String {
        match self {
            TypeDescriptor::Primitive(kind) => kind.keyword().to_string(),
            TypeDescriptor::Reference(name) => name.source_name(),
            TypeDescriptor::Array(array) => {
                let mut out = array.element.source_name();
                for _ in 0..array.dims {
                    out.push_str("[]");
                }
                out
            }
        }
    }

    /// Name used in conversion error messages: primitives by their box class
    pub fn boxed_name(&self) -> String {
        match self {
            TypeDescriptor::Primitive(PrimitiveKind::Void) => "void".to_string(),
            TypeDescriptor::Primitive(kind) => kind.box_class().to_string(),
            other => other.source_name(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source_name())
    }
}

impl Serialize for TypeDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_descriptors() {
        let chars: String = PrimitiveKind::ALL
            .iter()
            .map(|kind| kind.descriptor_char())
            .collect();
        assert_eq!(chars, "VZBSCIJFD");
        assert_eq!(PrimitiveKind::from_keyword("long"), Some(PrimitiveKind::Long));
        assert_eq!(PrimitiveKind::from_keyword("Long"), None);
    }

    #[test]
    fn test_array_dims_collapse() {
        let int = TypeDescriptor::Primitive(PrimitiveKind::Int);
        let nested = int.array_of(1).array_of(1);
        let direct = int.array_of(2);
        assert_eq!(nested, direct);
        assert_eq!(direct.descriptor(), "[[I");
        assert_eq!(direct.as_array().unwrap().element(), &int);
        assert_eq!(int.array_of(0), int);
    }

    #[test]
    fn test_array_component() {
        let string = TypeDescriptor::reference("java.lang.String");
        let arr = string.array_of(2);
        assert_eq!(arr.as_array().unwrap().component(), string.array_of(1));
        assert_eq!(string.array_of(1).as_array().unwrap().component(), string);
    }

    #[test]
    fn test_reference_names() {
        let nested = TypeDescriptor::reference("com.example.Class1$Class11");
        assert_eq!(nested.descriptor(), "Lcom/example/Class1$Class11;");
        assert_eq!(nested.source_name(), "com.example.Class1.Class11");
        assert_eq!(
            nested.array_of(1).class_constant_name().unwrap(),
            "[Lcom/example/Class1$Class11;"
        );
        assert_eq!(nested.class_constant_name().unwrap(), "com/example/Class1$Class11");
    }

    #[test]
    fn test_sizes() {
        assert_eq!(TypeDescriptor::VOID.size(), 0);
        assert_eq!(TypeDescriptor::Primitive(PrimitiveKind::Double).size(), 2);
        assert_eq!(TypeDescriptor::Primitive(PrimitiveKind::Long).array_of(1).size(), 1);
        assert_eq!(TypeDescriptor::object().size(), 1);
    }

    #[test]
    fn test_class_name_parts() {
        let name = ClassName::new("one.two.Outer$Inner");
        assert_eq!(name.package(), "one.two");
        assert_eq!(name.simple_name(), "Outer$Inner");
        assert!(name.is_well_formed());
        assert!(!ClassName::new("one..Two").is_well_formed());
        assert!(!ClassName::new("one.2two").is_well_formed());
        assert_eq!(ClassName::new("Top").package(), "");
    }

    #[test]
    fn test_boxed_name() {
        assert_eq!(
            TypeDescriptor::Primitive(PrimitiveKind::Int).boxed_name(),
            "java.lang.Integer"
        );
        assert_eq!(
            TypeDescriptor::reference("java.lang.String").array_of(1).boxed_name(),
            "java.lang.String[]"
        );
    }
}
