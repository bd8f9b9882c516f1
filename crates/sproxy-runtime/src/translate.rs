//! Exceptions crossing back into the VM

use crate::error::RegistryError;
use crate::object::DynError;
use sproxy_types::{ClassName, TypeHierarchy};
use std::fmt;

/// `java.lang.NullPointerException`
pub const NULL_POINTER: &str = "java.lang.NullPointerException";
/// `java.lang.ClassCastException`
pub const CLASS_CAST: &str = "java.lang.ClassCastException";
/// `java.lang.IllegalStateException`
pub const ILLEGAL_STATE: &str = "java.lang.IllegalStateException";
/// `java.lang.reflect.UndeclaredThrowableException`
pub const UNDECLARED_THROWABLE: &str = "java.lang.reflect.UndeclaredThrowableException";
/// Raised for unrecoverable routing failures
pub const FATAL: &str = "java.lang.Error";
/// Default wrapper for dynamic failures with no VM type
pub const DYNAMIC_EXCEPTION: &str = "sproxy.runtime.DynamicException";

/// An exception to be thrown in the VM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thrown {
    /// Exception class
    pub class: ClassName,
    /// Detail message
    pub message: Option<String>,
    /// Cause
    pub cause: Option<Box<Thrown>>,
}

impl Thrown {
    /// Exception of `class` with a message
    pub fn new(class: &str, message: impl Into<String>) -> Self {
        Self {
            class: ClassName::new(class),
            message: Some(message.into()),
            cause: None,
        }
    }

    /// Whether the exception is exactly of class `class`
    pub fn is(&self, class: &str) -> bool {
        self.class.as_str() == class
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.class, message)?,
            None => write!(f, "{}", self.class)?,
        }
        if let Some(cause) = &self.cause {
            write!(f, " (caused by {})", cause)?;
        }
        Ok(())
    }
}

impl From<&RegistryError> for Thrown {
    fn from(err: &RegistryError) -> Self {
        let class = match err {
            RegistryError::AlreadyBound(_) => FATAL,
            _ => ILLEGAL_STATE,
        };
        Thrown::new(class, err.to_string())
    }
}

/// Translate a dynamic failure for a member declaring `throws`.
///
/// VM exceptions pass through when unchecked or assignable to a declared
/// type; other checked exceptions are wrapped in
/// `UndeclaredThrowableException`. Failures without a VM type become
/// `wrapper` with message `<DynType>: <message>`.
pub fn translate(error: &DynError, throws: &[ClassName], hierarchy: &dyn TypeHierarchy, wrapper: &str) -> Thrown {
    let Some(vm_type) = error.vm_type() else {
        return Thrown::new(wrapper, error.to_string());
    };

    let thrown = Thrown {
        class: vm_type.clone(),
        message: Some(error.message().to_string()),
        cause: None,
    };
    let declared = throws
        .iter()
        .any(|t| hierarchy.is_assignable(vm_type.as_str(), t.as_str()));
    if declared || hierarchy.is_unchecked(vm_type.as_str()) {
        thrown
    } else {
        Thrown {
            class: ClassName::new(UNDECLARED_THROWABLE),
            message: None,
            cause: Some(Box::new(thrown)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sproxy_types::StandardHierarchy;

    fn hierarchy() -> StandardHierarchy {
        StandardHierarchy::new()
            .with_class("com.example.Class1", "java.lang.Exception")
            .with_class("com.example.Class2", "java.lang.Exception")
            .with_class("com.example.Class2Sub", "com.example.Class2")
    }

    #[test]
    fn test_declared_and_unchecked_pass_through() {
        let h = hierarchy();
        let throws = [ClassName::new("com.example.Class1"), ClassName::new("com.example.Class2")];

        let t = translate(&DynError::vm("com.example.Class2", "boom"), &throws, &h, DYNAMIC_EXCEPTION);
        assert!(t.is("com.example.Class2"));
        assert_eq!(t.message.as_deref(), Some("boom"));

        let t = translate(&DynError::vm("com.example.Class2Sub", "sub"), &throws, &h, DYNAMIC_EXCEPTION);
        assert!(t.is("com.example.Class2Sub"));

        let t = translate(&DynError::vm(ILLEGAL_STATE, "state"), &[], &h, DYNAMIC_EXCEPTION);
        assert!(t.is(ILLEGAL_STATE));
    }

    #[test]
    fn test_undeclared_is_wrapped() {
        let h = hierarchy();
        let t = translate(
            &DynError::vm("java.io.IOException", "io"),
            &[ClassName::new("com.example.Class1")],
            &h,
            DYNAMIC_EXCEPTION,
        );
        assert!(t.is(UNDECLARED_THROWABLE));
        assert!(t.cause.unwrap().is("java.io.IOException"));
    }

    #[test]
    fn test_dynamic_failure() {
        let t = translate(&DynError::new("TypeError", "te"), &[], &hierarchy(), DYNAMIC_EXCEPTION);
        assert!(t.is(DYNAMIC_EXCEPTION));
        assert_eq!(t.message.as_deref(), Some("TypeError: te"));
    }
}
