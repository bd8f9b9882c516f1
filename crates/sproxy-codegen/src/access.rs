//! Modifier keywords to VM access flags

use sproxy_classfile::flags::*;
use sproxy_model::{Modifier, Modifiers};

fn flag(modifier: Modifier) -> u16 {
    match modifier {
        Modifier::Public => ACC_PUBLIC,
        Modifier::Protected => ACC_PROTECTED,
        Modifier::Private => ACC_PRIVATE,
        Modifier::Final => ACC_FINAL,
        Modifier::Abstract => ACC_ABSTRACT,
        Modifier::Static => ACC_STATIC,
        Modifier::Synchronized => ACC_SYNCHRONIZED,
        Modifier::Native => ACC_NATIVE,
        Modifier::Strictfp => ACC_STRICT,
    }
}

/// Method or constructor flags. The manual token is source-only.
pub fn member_flags(modifiers: &Modifiers) -> u16 {
    modifiers.keywords().iter().fold(0, |acc, m| acc | flag(*m))
}

/// Class flags, always including `ACC_SUPER`
pub fn class_flags(modifiers: &Modifiers) -> u16 {
    member_flags(modifiers) | ACC_SUPER
}
