//! Identities and dispatch keys

use crate::value::Value;
use rustc_hash::FxHasher;
use sproxy_types::ClassName;
use std::fmt;
use std::hash::{Hash, Hasher};

/// VM-side identity of a generated instance (for example a global
/// reference or identity hash supplied by the native glue)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Wrap a raw identity
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identity
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// Key selecting the dynamic object behind a many-to-one proxy
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    interface: ClassName,
    fingerprint: u64,
}

impl DispatchKey {
    /// Key from an explicit fingerprint
    pub fn new(interface: ClassName, fingerprint: u64) -> Self {
        Self {
            interface,
            fingerprint,
        }
    }

    /// Key derived from the interface and the call's arguments
    pub fn from_call(interface: &str, args: &[Value]) -> Self {
        let mut hasher = FxHasher::default();
        for arg in args {
            fingerprint(arg, &mut hasher);
        }
        Self::new(ClassName::new(interface), hasher.finish())
    }

    /// Interface the key belongs to
    pub fn interface(&self) -> &ClassName {
        &self.interface
    }

    /// Argument fingerprint
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

fn fingerprint(value: &Value, hasher: &mut FxHasher) {
    std::mem::discriminant(value).hash(hasher);
    match value {
        Value::Null => {}
        Value::Boolean(v) => v.hash(hasher),
        Value::Byte(v) => v.hash(hasher),
        Value::Short(v) => v.hash(hasher),
        Value::Char(v) => v.hash(hasher),
        Value::Int(v) => v.hash(hasher),
        Value::Long(v) => v.hash(hasher),
        // Floats hash by bit pattern.
        Value::Float(v) => v.to_bits().hash(hasher),
        Value::Double(v) => v.to_bits().hash(hasher),
        Value::Str(v) => v.hash(hasher),
        Value::Array(items) => {
            items.len().hash(hasher);
            for item in items {
                fingerprint(item, hasher);
            }
        }
        Value::Object(obj) => obj.hash(hasher),
    }
}
