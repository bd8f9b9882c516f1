//! Name resolution services
//!
//! The catalogue never decides on its own what a bare name like `String`
//! means. It asks a [`NameResolver`], which in practice models the imports of
//! the dynamic-language module that declared the proxy.

use crate::ty::is_identifier;
use rustc_hash::{FxHashMap, FxHashSet};

/// Maps declared type names to fully-qualified binary class names
pub trait NameResolver: Send + Sync {
    /// Resolve `name` (simple, dotted or nested) to a binary class name
    fn resolve_name(&self, name: &str) -> Option<String>;

    /// Whether the named class exposes a constructor taking no arguments.
    ///
    /// Resolvers that know nothing about the class assume it does.
    fn has_no_arg_constructor(&self, _class: &str) -> bool {
        true
    }
}

/// Resolver backed by a table of import bindings
///
/// `bind("Class1", "com.example.Class1")` makes `Class1`, `Class1.Class11`
/// and `Class1.Class11.Class111` resolvable; the latter two become nested
/// binary names (`com.example.Class1$Class11`). Unbound dotted names whose
/// first segment starts lowercase are taken as already package-qualified.
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    bindings: FxHashMap<String, String>,
    no_default_ctor: FxHashSet<String>,
}

impl ImportTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a simple name to a qualified class name
    pub fn bind(&mut self, name: impl Into<String>, qualified: impl Into<String>) -> &mut Self {
        self.bindings.insert(name.into(), qualified.into());
        self
    }

    /// Builder-style variant of [`ImportTable::bind`]
    pub fn with(mut self, name: impl Into<String>, qualified: impl Into<String>) -> Self {
        self.bind(name, qualified);
        self
    }

    /// Record that a class has no accessible no-argument constructor
    pub fn without_default_constructor(mut self, qualified: impl Into<String>) -> Self {
        self.no_default_ctor.insert(qualified.into());
        self
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table has no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn resolve_qualified(name: &str) -> Option<String> {
        let mut out = String::with_capacity(name.len());
        let mut in_class = false;
        for (i, segment) in name.split('.').enumerate() {
            if !is_identifier(segment) {
                return None;
            }
            if i > 0 {
                out.push(if in_class { '$' } else { '.' });
            }
            if segment.starts_with(|c: char| c.is_uppercase()) {
                in_class = true;
            }
            out.push_str(segment);
        }
        // A package path with no class segment is not a type.
        in_class.then_some(out)
    }
}

impl NameResolver for ImportTable {
    fn resolve_name(&self, name: &str) -> Option<String> {
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };

        if let Some(bound) = self.bindings.get(head) {
            let mut out = bound.clone();
            if let Some(rest) = rest {
                for segment in rest.split('.') {
                    if !is_identifier(segment) {
                        return None;
                    }
                    out.push('$');
                    out.push_str(segment);
                }
            }
            return Some(out);
        }

        if rest.is_some() && head.starts_with(|c: char| c.is_lowercase()) {
            return Self::resolve_qualified(name);
        }
        None
    }

    fn has_no_arg_constructor(&self, class: &str) -> bool {
        !self.no_default_ctor.contains(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ImportTable {
        ImportTable::new()
            .with("Class1", "com.example.Class1")
            .with("String", "java.lang.String")
    }

    #[test]
    fn test_bound_names() {
        let t = table();
        assert_eq!(t.resolve_name("String").as_deref(), Some("java.lang.String"));
        assert_eq!(
            t.resolve_name("Class1.Class11.Class111").as_deref(),
            Some("com.example.Class1$Class11$Class111")
        );
        assert_eq!(t.resolve_name("Missing"), None);
    }

    #[test]
    fn test_qualified_names() {
        let t = table();
        assert_eq!(
            t.resolve_name("java.util.Map.Entry").as_deref(),
            Some("java.util.Map$Entry")
        );
        assert_eq!(t.resolve_name("java.util"), None);
        assert_eq!(t.resolve_name("java..Map"), None);
    }

    #[test]
    fn test_default_constructor_knowledge() {
        let t = table().without_default_constructor("com.example.NoCtor");
        assert!(t.has_no_arg_constructor("com.example.Class1"));
        assert!(!t.has_no_arg_constructor("com.example.NoCtor"));
    }
}
