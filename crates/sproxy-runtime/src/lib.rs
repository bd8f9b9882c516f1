//! Static proxy runtime
//!
//! The process-side half of a static proxy: generated VM classes call the
//! bridge, the bridge lands in [`ProxyRuntime`], and the runtime routes the
//! call to the dynamic object bound to the VM instance. Routing tables are
//! concurrent; dynamic code itself runs under a single reentrant
//! [`InterpreterLock`].

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bridge;
pub mod classes;
pub mod convert;
pub mod error;
pub mod identity;
pub mod keyed;
pub mod lock;
pub mod object;
pub mod registry;
pub mod translate;
pub mod value;

pub use bridge::{install, installed, Outcome, ProxyRuntime, RuntimeConfig};
pub use classes::{ClassTable, DuplicateClassPolicy, MemberEntry, ProxyClass};
pub use convert::coerce_return;
pub use error::{DispatchError, RegistryError};
pub use identity::{DispatchKey, ObjectId};
pub use keyed::KeyedRegistry;
pub use lock::InterpreterLock;
pub use object::{DynError, DynResult, DynamicClass, DynamicObject};
pub use registry::InstanceRegistry;
pub use translate::{translate, Thrown};
pub use value::{ObjectRef, Value};
