//! Type descriptor catalogue
//!
//! Turns declaration tokens (`int`, `String[][]`, `Class1.Class11`) into
//! [`TypeDescriptor`]s. Reference names are resolved once through the active
//! [`NameResolver`] and interned, so every occurrence of the same class shares
//! one allocation.

use crate::error::TypeError;
use crate::resolver::NameResolver;
use crate::ty::{ClassName, PrimitiveKind, TypeDescriptor};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Resolves type tokens against a name-resolution service
pub struct TypeCatalogue {
    resolver: Arc<dyn NameResolver>,
    interned: Mutex<FxHashMap<String, ClassName>>,
}

impl TypeCatalogue {
    /// Create a catalogue over the given resolver
    pub fn new(resolver: impl NameResolver + 'static) -> Self {
        Self::with_resolver(Arc::new(resolver))
    }

    /// Create a catalogue over a shared resolver
    pub fn with_resolver(resolver: Arc<dyn NameResolver>) -> Self {
        Self {
            resolver,
            interned: Mutex::new(FxHashMap::default()),
        }
    }

    /// The underlying name-resolution service
    pub fn resolver(&self) -> &dyn NameResolver {
        self.resolver.as_ref()
    }

    /// Resolve a declaration token to a descriptor
    pub fn resolve(&self, token: &str) -> Result<TypeDescriptor, TypeError> {
        let (base, dims) = split_array_suffix(token)?;

        let element = match PrimitiveKind::from_keyword(base) {
            Some(PrimitiveKind::Void) if dims > 0 => {
                return Err(TypeError::VoidArray {
                    token: token.to_string(),
                })
            }
            Some(kind) => TypeDescriptor::Primitive(kind),
            None => TypeDescriptor::Reference(self.resolve_class_name(base, token)?),
        };
        Ok(element.array_of(dims))
    }

    /// Resolve a token that must name a class (no primitives, no arrays)
    pub fn resolve_class(&self, token: &str) -> Result<ClassName, TypeError> {
        match self.resolve(token)? {
            TypeDescriptor::Reference(name) => Ok(name),
            _ => Err(TypeError::UnknownType {
                token: token.to_string(),
            }),
        }
    }

    /// Pure and total array constructor; see [`TypeDescriptor::array_of`]
    pub fn array_of(&self, descriptor: &TypeDescriptor, dims: u8) -> TypeDescriptor {
        descriptor.array_of(dims)
    }

    /// Number of distinct reference names resolved so far
    pub fn interned_count(&self) -> usize {
        self.interned.lock().len()
    }

    fn resolve_class_name(&self, base: &str, token: &str) -> Result<ClassName, TypeError> {
        if let Some(name) = self.interned.lock().get(base) {
            return Ok(name.clone());
        }

        let qualified = self
            .resolver
            .resolve_name(base)
            .ok_or_else(|| TypeError::UnknownType {
                token: token.to_string(),
            })?;
        let name = ClassName::new(qualified);
        if !name.is_well_formed() {
            return Err(TypeError::Malformed {
                token: token.to_string(),
            });
        }

        self.interned.lock().insert(base.to_string(), name.clone());
        Ok(name)
    }
}

impl std::fmt::Debug for TypeCatalogue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCatalogue")
            .field("interned", &self.interned_count())
            .finish()
    }
}

/// Split `Foo[][]` into (`Foo`, 2)
fn split_array_suffix(token: &str) -> Result<(&str, u8), TypeError> {
    let malformed = || TypeError::Malformed {
        token: token.to_string(),
    };

    let mut base = token.trim();
    let mut dims: u8 = 0;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped.trim_end();
        dims = dims.checked_add(1).ok_or_else(malformed)?;
    }

    if base.is_empty() || base.contains(|c: char| c == '[' || c == ']' || c.is_whitespace()) {
        return Err(malformed());
    }
    Ok((base, dims))
}
