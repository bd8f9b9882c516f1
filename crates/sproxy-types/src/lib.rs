//! sproxy type system
//!
//! Type descriptors for proxy signatures, the catalogue that resolves
//! declaration tokens into them, and the class hierarchy used for exception
//! checks at runtime.

#![warn(missing_docs)]

pub mod catalogue;
pub mod error;
pub mod hierarchy;
pub mod resolver;
pub mod ty;

pub use catalogue::TypeCatalogue;
pub use error::TypeError;
pub use hierarchy::{StandardHierarchy, TypeHierarchy};
pub use resolver::{ImportTable, NameResolver};
pub use ty::{is_identifier, ArrayType, ClassName, PrimitiveKind, TypeDescriptor, OBJECT_CLASS};
