//! Runtime errors

use crate::identity::ObjectId;
use crate::object::DynError;
use sproxy_classfile::ClassFileError;
use thiserror::Error;

/// Registry and class-table failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    /// Identity is already bound to a different instance
    #[error("object {0} is already bound to a different instance")]
    AlreadyBound(ObjectId),

    /// No binding for the identity
    #[error("object {0} is not bound to a dynamic instance")]
    UnboundInstance(ObjectId),

    /// The generated class was used before its dynamic class was registered
    #[error("static proxy class {0} loaded before its dynamic counterpart")]
    UnknownClass(String),

    /// Member key not declared by the class
    #[error("{class} has no member {member}")]
    UnknownMember {
        /// Class name
        class: String,
        /// Member key
        member: String,
    },

    /// Class registered twice under [`crate::DuplicateClassPolicy::Reject`]
    #[error("static proxy class {0} is already registered")]
    DuplicateClass(String),

    /// Loaded class extends a different base than declared
    #[error("{class}: expected extends {expected}, but VM class actually extends {actual}")]
    BaseMismatch {
        /// Class name
        class: String,
        /// Declared base
        expected: String,
        /// Base found in the class file
        actual: String,
    },

    /// Loaded class lacks a declared interface
    #[error("{class}: expected implements {expected}, but VM class does not")]
    InterfaceMismatch {
        /// Class name
        class: String,
        /// Missing interface
        expected: String,
    },

    /// Loaded bytes are not a valid class file
    #[error("{class}: {source}")]
    InvalidClassFile {
        /// Class name
        class: String,
        /// Decode failure
        #[source]
        source: ClassFileError,
    },

    /// A runtime is already installed for this process
    #[error("a proxy runtime is already installed")]
    AlreadyInstalled,
}

/// Failure of a registry dispatch
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DispatchError {
    /// Routing failed before reaching dynamic code
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Dynamic code raised
    #[error("{0}")]
    Dynamic(#[from] DynError),
}
