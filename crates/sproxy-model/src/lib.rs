//! sproxy member model
//!
//! Turns proxy class declarations into validated [`ClassSpec`]s: modifiers,
//! signatures, overload groups, and the declaration-file and JSON summary
//! surfaces around them.

#![warn(missing_docs)]

pub mod builder;
pub mod class_spec;
pub mod decl;
pub mod error;
pub mod modifiers;
pub mod overload;
pub mod resolver;
pub mod signature;
pub mod summary;

pub use builder::{ClassSpecBuilder, ConstructorDecl, MethodDecl};
pub use class_spec::ClassSpec;
pub use decl::{DeclFileError, EmitOverrides, ModuleDecl};
pub use error::DeclError;
pub use modifiers::{Modifier, ModifierError, Modifiers};
pub use overload::{MemberGroup, Overload, CONSTRUCTOR_IMPLEMENTATION, CONSTRUCTOR_NAME};
pub use signature::Signature;
pub use summary::ClassSummary;
