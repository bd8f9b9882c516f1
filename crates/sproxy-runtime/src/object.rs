//! The dynamic side of a proxy

use crate::value::Value;
use sproxy_types::ClassName;
use std::fmt;
use std::sync::Arc;

/// Failure raised by dynamic code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynError {
    vm_type: Option<ClassName>,
    dyn_type: String,
    message: String,
}

impl DynError {
    /// Native dynamic-language exception with no VM counterpart
    /// (`TypeError`, `KeyError`, ...)
    pub fn new(dyn_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            vm_type: None,
            dyn_type: dyn_type.into(),
            message: message.into(),
        }
    }

    /// A VM exception raised from dynamic code
    pub fn vm(class: &str, message: impl Into<String>) -> Self {
        let class = ClassName::new(class);
        Self {
            dyn_type: class.simple_name().to_string(),
            vm_type: Some(class),
            message: message.into(),
        }
    }

    /// VM exception class, if the failure carries one
    pub fn vm_type(&self) -> Option<&ClassName> {
        self.vm_type.as_ref()
    }

    /// Dynamic-language type name
    pub fn dyn_type(&self) -> &str {
        &self.dyn_type
    }

    /// Message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DynError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dyn_type, self.message)
    }
}

impl std::error::Error for DynError {}

/// Result of a dynamic call
pub type DynResult<T> = Result<T, DynError>;

/// A dynamic-language object bound to a generated VM instance
pub trait DynamicObject: Send + Sync {
    /// Invoke the callable named `member` with `args`
    fn call(&self, member: &str, args: &[Value]) -> DynResult<Value>;
}

/// A dynamic-language class paired with a generated VM class
pub trait DynamicClass: Send + Sync {
    /// Create an uninitialised instance; the constructor implementation is
    /// invoked on it once it is bound
    fn allocate(&self) -> DynResult<Arc<dyn DynamicObject>>;

    /// Invoke a static member
    fn call_static(&self, member: &str, _args: &[Value]) -> DynResult<Value> {
        Err(DynError::new(
            "AttributeError",
            format!("type object has no attribute '{}'", member),
        ))
    }
}

/// Pointer identity of two dynamic objects, ignoring vtables
pub(crate) fn same_object(a: &Arc<dyn DynamicObject>, b: &Arc<dyn DynamicObject>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
