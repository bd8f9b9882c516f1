//! Class hierarchy queries
//!
//! The runtime needs just enough of the VM class graph to decide how a thrown
//! exception crosses the boundary: is it unchecked, and is it assignable to one
//! of the member's declared thrown types.

use rustc_hash::FxHashMap;

/// `java.lang.Throwable`
pub const THROWABLE: &str = "java.lang.Throwable";
/// `java.lang.RuntimeException`
pub const RUNTIME_EXCEPTION: &str = "java.lang.RuntimeException";
/// `java.lang.Error`
pub const ERROR: &str = "java.lang.Error";

/// Superclass chain lookups over binary class names
pub trait TypeHierarchy: Send + Sync {
    /// Direct superclass, or `None` for the root or an unknown class
    fn superclass(&self, class: &str) -> Option<String>;

    /// Whether a value of `sub` can be stored in a variable of type `sup`
    fn is_assignable(&self, sub: &str, sup: &str) -> bool {
        let mut current = sub.to_string();
        // Bounded walk: a malformed table must not spin forever.
        for _ in 0..64 {
            if current == sup {
                return true;
            }
            match self.superclass(&current) {
                Some(parent) => current = parent,
                None => return sup == crate::ty::OBJECT_CLASS,
            }
        }
        false
    }

    /// Whether `class` is exempt from `throws` checking
    fn is_unchecked(&self, class: &str) -> bool {
        self.is_assignable(class, RUNTIME_EXCEPTION) || self.is_assignable(class, ERROR)
    }
}

/// Hierarchy with the common `java.lang` / `java.io` throwables preloaded
#[derive(Debug, Clone)]
pub struct StandardHierarchy {
    parents: FxHashMap<String, String>,
}

const STANDARD_THROWABLES: &[(&str, &str)] = &[
    (THROWABLE, "java.lang.Object"),
    ("java.lang.Exception", THROWABLE),
    (ERROR, THROWABLE),
    (RUNTIME_EXCEPTION, "java.lang.Exception"),
    ("java.lang.ReflectiveOperationException", "java.lang.Exception"),
    ("java.lang.ClassNotFoundException", "java.lang.ReflectiveOperationException"),
    ("java.lang.InterruptedException", "java.lang.Exception"),
    ("java.lang.CloneNotSupportedException", "java.lang.Exception"),
    ("java.io.IOException", "java.lang.Exception"),
    ("java.io.EOFException", "java.io.IOException"),
    ("java.io.FileNotFoundException", "java.io.IOException"),
    ("java.io.UncheckedIOException", RUNTIME_EXCEPTION),
    ("java.lang.IllegalStateException", RUNTIME_EXCEPTION),
    ("java.lang.IllegalArgumentException", RUNTIME_EXCEPTION),
    ("java.lang.NumberFormatException", "java.lang.IllegalArgumentException"),
    ("java.lang.NullPointerException", RUNTIME_EXCEPTION),
    ("java.lang.ClassCastException", RUNTIME_EXCEPTION),
    ("java.lang.ArithmeticException", RUNTIME_EXCEPTION),
    ("java.lang.IndexOutOfBoundsException", RUNTIME_EXCEPTION),
    ("java.lang.ArrayIndexOutOfBoundsException", "java.lang.IndexOutOfBoundsException"),
    ("java.lang.UnsupportedOperationException", RUNTIME_EXCEPTION),
    ("java.lang.reflect.UndeclaredThrowableException", RUNTIME_EXCEPTION),
    ("java.lang.LinkageError", ERROR),
    ("java.lang.AssertionError", ERROR),
    ("java.lang.VirtualMachineError", ERROR),
    ("java.lang.OutOfMemoryError", "java.lang.VirtualMachineError"),
    ("java.lang.StackOverflowError", "java.lang.VirtualMachineError"),
];

impl StandardHierarchy {
    /// Hierarchy containing only the standard throwables
    pub fn new() -> Self {
        let parents = STANDARD_THROWABLES
            .iter()
            .map(|(class, parent)| (class.to_string(), parent.to_string()))
            .collect();
        Self { parents }
    }

    /// Add or replace a `(class, superclass)` edge
    pub fn insert(&mut self, class: impl Into<String>, superclass: impl Into<String>) {
        self.parents.insert(class.into(), superclass.into());
    }

    /// Builder-style variant of [`StandardHierarchy::insert`]
    pub fn with_class(mut self, class: impl Into<String>, superclass: impl Into<String>) -> Self {
        self.insert(class, superclass);
        self
    }

    /// Whether the class is known to this hierarchy
    pub fn contains(&self, class: &str) -> bool {
        self.parents.contains_key(class)
    }
}

impl Default for StandardHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeHierarchy for StandardHierarchy {
    fn superclass(&self, class: &str) -> Option<String> {
        self.parents.get(class).cloned()
    }
}
