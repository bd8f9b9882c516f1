//! Emission errors

use sproxy_classfile::ClassFileError;
use thiserror::Error;

/// Errors raised while emitting a class. Emission never produces partial
/// output: any error discards the whole class.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EmitError {
    /// A class name in the spec or the options is not a well-formed binary name
    #[error("{class}: unresolved reference {name:?}")]
    UnresolvedReference {
        /// Class being emitted
        class: String,
        /// Offending name
        name: String,
    },

    /// A member exceeds a VM limit
    #[error("{class}: {member}: {what} exceeds VM limit ({actual} > {limit})")]
    LimitExceeded {
        /// Class being emitted
        class: String,
        /// Member key
        member: String,
        /// Limit that was hit
        what: &'static str,
        /// Actual value
        actual: usize,
        /// Maximum allowed
        limit: usize,
    },

    /// Low-level class file failure (for example constant pool overflow)
    #[error("{class}: {source}")]
    ClassFile {
        /// Class being emitted
        class: String,
        /// Underlying error
        #[source]
        source: ClassFileError,
    },
}
