//! Type resolution errors

use thiserror::Error;

/// Errors that can occur while resolving type tokens
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// Token is neither a primitive keyword nor a resolvable reference
    #[error("Unknown type: {token}")]
    UnknownType {
        /// Token as written in the declaration
        token: String,
    },

    /// Array element type may not be void
    #[error("Invalid array element type in {token}: void")]
    VoidArray {
        /// Token as written in the declaration
        token: String,
    },

    /// Token is syntactically malformed (empty, stray brackets, bad identifier)
    #[error("Malformed type token: {token:?}")]
    Malformed {
        /// Token as written in the declaration
        token: String,
    },
}
