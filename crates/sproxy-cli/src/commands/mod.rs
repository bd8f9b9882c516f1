//! Subcommand implementations

pub mod decls;
pub mod emit;
pub mod files;
pub mod inspect;
pub mod java;
pub mod json;
