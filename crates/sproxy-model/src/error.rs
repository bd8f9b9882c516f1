//! Declaration errors

use crate::modifiers::ModifierError;
use sproxy_types::TypeError;
use thiserror::Error;

/// Errors raised while building a class declaration.
///
/// Every variant names the class and, where there is one, the member with its
/// declared signature.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeclError {
    /// A type token could not be resolved
    #[error("{class}: {member}: {source}")]
    UnknownType {
        /// Declaring class
        class: String,
        /// Member as declared (`add(int)`), or the clause (`extends`)
        member: String,
        /// Underlying resolution failure
        #[source]
        source: TypeError,
    },

    /// Two overloads share one parameter list
    #[error("{class}: ambiguous overload {signature}: an overload with the same parameter types is already declared")]
    AmbiguousOverload {
        /// Declaring class
        class: String,
        /// Offending signature
        signature: String,
    },

    /// The same interface is listed twice
    #[error("{class}: interface {interface} is implemented more than once")]
    DuplicateInterface {
        /// Declaring class
        class: String,
        /// Repeated interface
        interface: String,
    },

    /// The override flag and a manual `@Override` on the same overload
    #[error("{class}: {signature}: override flag conflicts with manual modifier {manual}")]
    ConflictingOverride {
        /// Declaring class
        class: String,
        /// Offending signature
        signature: String,
        /// The manual token
        manual: String,
    },

    /// The base class cannot be constructed without arguments
    #[error("{class}: base class {base} has no no-argument constructor to chain to")]
    NoDefaultConstructor {
        /// Declaring class
        class: String,
        /// Base class
        base: String,
    },

    /// Rejected modifiers string
    #[error("{class}: {member}: invalid modifiers {text:?}: {source}")]
    InvalidModifier {
        /// Declaring class
        class: String,
        /// Member as declared, or `class` for class modifiers
        member: String,
        /// Modifiers string as written
        text: String,
        /// Reason
        #[source]
        source: ModifierError,
    },

    /// A thrown type is not a class
    #[error("{class}: {member}: {token} cannot be thrown")]
    NotThrowable {
        /// Declaring class
        class: String,
        /// Member as declared
        member: String,
        /// Thrown token as written
        token: String,
    },

    /// A parameter was declared `void`
    #[error("{class}: {member}: void is not a valid parameter type")]
    VoidParameter {
        /// Declaring class
        class: String,
        /// Member as declared
        member: String,
    },

    /// A method name that the VM reserves or cannot represent
    #[error("{class}: `{name}` cannot be declared as a method")]
    ReservedName {
        /// Declaring class
        class: String,
        /// Rejected name
        name: String,
    },

    /// Class or package name is not a valid VM name
    #[error("invalid class name {name:?}")]
    InvalidClassName {
        /// Rejected name
        name: String,
    },
}

impl DeclError {
    /// Class the error was reported against
    pub fn class(&self) -> &str {
        match self {
            DeclError::UnknownType { class, .. }
            | DeclError::AmbiguousOverload { class, .. }
            | DeclError::DuplicateInterface { class, .. }
            | DeclError::ConflictingOverride { class, .. }
            | DeclError::NoDefaultConstructor { class, .. }
            | DeclError::InvalidModifier { class, .. }
            | DeclError::NotThrowable { class, .. }
            | DeclError::VoidParameter { class, .. }
            | DeclError::ReservedName { class, .. } => class,
            DeclError::InvalidClassName { name } => name,
        }
    }
}
