//! Static proxy code generation
//!
//! Turns [`sproxy_model::ClassSpec`]s into JVM class files whose members
//! forward every call through a bridge class into the dynamic runtime, and
//! into Java source stubs for compiling against the proxies.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod access;
pub mod body;
pub mod emit;
pub mod error;
pub mod java_source;
pub mod options;

pub use emit::{emit, emit_bytes, Emitter, MAX_PARAMETER_SLOTS};
pub use error::EmitError;
pub use java_source::java_source;
pub use options::{EmitOptions, DEFAULT_BRIDGE, DEFAULT_MARKER};
