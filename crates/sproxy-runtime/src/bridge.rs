//! Dispatch bridge
//!
//! [`ProxyRuntime`] is what the bridge class's native entry points call
//! into. Each entry point returns an [`Outcome`]: either the value to
//! return to the VM or the exception to throw there.

use crate::classes::{ClassTable, DuplicateClassPolicy, MemberEntry, ProxyClass};
use crate::convert::coerce_return;
use crate::error::RegistryError;
use crate::identity::{DispatchKey, ObjectId};
use crate::keyed::KeyedRegistry;
use crate::lock::InterpreterLock;
use crate::object::{DynError, DynResult, DynamicClass, DynamicObject};
use crate::registry::InstanceRegistry;
use crate::translate::{translate, Thrown, DYNAMIC_EXCEPTION};
use crate::value::Value;
use once_cell::sync::OnceCell;
use sproxy_classfile::ClassFile;
use sproxy_model::{ClassSpec, CONSTRUCTOR_IMPLEMENTATION};
use sproxy_types::{StandardHierarchy, TypeHierarchy};
use std::sync::Arc;

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Behaviour when a class name is registered twice
    pub duplicate_policy: DuplicateClassPolicy,
    /// Unchecked exception used for dynamic failures with no VM type
    pub dynamic_exception: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicateClassPolicy::Reject,
            dynamic_exception: DYNAMIC_EXCEPTION.to_string(),
        }
    }
}

/// Result of an entry point
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Return this value
    Return(Value),
    /// Throw this exception
    Throw(Thrown),
}

impl Outcome {
    /// Returned value, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Return(value) => Some(value),
            Outcome::Throw(_) => None,
        }
    }

    /// Thrown exception, if any
    pub fn thrown(&self) -> Option<&Thrown> {
        match self {
            Outcome::Return(_) => None,
            Outcome::Throw(thrown) => Some(thrown),
        }
    }

    /// Convert into a `Result`
    pub fn into_result(self) -> Result<Value, Thrown> {
        match self {
            Outcome::Return(value) => Ok(value),
            Outcome::Throw(thrown) => Err(thrown),
        }
    }
}

impl From<Result<Value, Thrown>> for Outcome {
    fn from(result: Result<Value, Thrown>) -> Self {
        match result {
            Ok(value) => Outcome::Return(value),
            Err(thrown) => Outcome::Throw(thrown),
        }
    }
}

/// Process-scoped proxy runtime
pub struct ProxyRuntime {
    classes: ClassTable,
    instances: InstanceRegistry,
    keyed: KeyedRegistry,
    hierarchy: Arc<dyn TypeHierarchy>,
    lock: InterpreterLock,
    config: RuntimeConfig,
}

impl ProxyRuntime {
    /// Runtime with the standard exception hierarchy
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_hierarchy(config, Arc::new(StandardHierarchy::new()))
    }

    /// Runtime with a caller-supplied class hierarchy
    pub fn with_hierarchy(config: RuntimeConfig, hierarchy: Arc<dyn TypeHierarchy>) -> Self {
        Self {
            classes: ClassTable::new(config.duplicate_policy),
            instances: InstanceRegistry::new(),
            keyed: KeyedRegistry::new(),
            hierarchy,
            lock: InterpreterLock::new(),
            config,
        }
    }

    /// Configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Registered classes
    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    /// One-to-one bindings
    pub fn instances(&self) -> &InstanceRegistry {
        &self.instances
    }

    /// Many-to-one bindings
    pub fn keyed(&self) -> &KeyedRegistry {
        &self.keyed
    }

    /// Interpreter lock
    pub fn interpreter_lock(&self) -> &InterpreterLock {
        &self.lock
    }

    /// Make a generated class routable
    pub fn register_class(&self, spec: ClassSpec, dynamic: Arc<dyn DynamicClass>) -> Result<(), RegistryError> {
        self.classes.register(spec, dynamic).map(|_| ())
    }

    /// Check a loaded class file against the registered declaration
    pub fn verify_loaded(&self, class_name: &str, bytes: &[u8]) -> Result<(), RegistryError> {
        let class = self.classes.get(class_name)?;
        let invalid = |source| RegistryError::InvalidClassFile {
            class: class_name.to_string(),
            source,
        };
        let file = ClassFile::decode(bytes).map_err(invalid)?;

        let expected = class.spec().base();
        let actual = file
            .super_class_name()
            .map_err(invalid)?
            .map(|name| name.replace('/', "."))
            .unwrap_or_default();
        if actual != expected.as_str() {
            return Err(RegistryError::BaseMismatch {
                class: class_name.to_string(),
                expected: expected.to_string(),
                actual,
            });
        }

        let interfaces = file.interface_names().map_err(invalid)?;
        for interface in class.spec().implements() {
            if !interfaces.contains(&interface.internal_name().as_str()) {
                return Err(RegistryError::InterfaceMismatch {
                    class: class_name.to_string(),
                    expected: interface.to_string(),
                });
            }
        }
        Ok(())
    }

    fn lookup(&self, class: &str, key: &str) -> Result<(Arc<ProxyClass>, MemberEntry), Thrown> {
        let proxy = self.classes.get(class).map_err(|e| Thrown::from(&e))?;
        let member = proxy.member(key).map_err(|e| Thrown::from(&e))?.clone();
        Ok((proxy, member))
    }

    fn finish(&self, result: DynResult<Value>, member: &MemberEntry) -> Outcome {
        match result {
            Ok(value) => coerce_return(value, &member.ret).into(),
            Err(err) => Outcome::Throw(translate(
                &err,
                &member.throws,
                self.hierarchy.as_ref(),
                &self.config.dynamic_exception,
            )),
        }
    }

    /// Constructor entry point: allocate the dynamic instance, bind it to
    /// `identity`, then run its constructor implementation. The binding
    /// exists before this returns; a failing constructor removes it again.
    pub fn construct(&self, identity: ObjectId, class: &str, key: &str, args: &[Value]) -> Outcome {
        let (proxy, member) = match self.lookup(class, key) {
            Ok(found) => found,
            Err(thrown) => return Outcome::Throw(thrown),
        };
        if !member.is_constructor {
            return Outcome::Throw(Thrown::from(&wrong_kind(class, key)));
        }

        let instance = match self.lock.run(|| proxy.dynamic().allocate()) {
            Ok(instance) => instance,
            Err(err) => return self.finish(Err(err), &member),
        };
        if let Err(err) = self.instances.bind(identity, instance.clone()) {
            self.lock.run(move || drop(instance));
            return Outcome::Throw(Thrown::from(&err));
        }

        // Local references are dropped under the lock too: a concurrent
        // release may have left them as the last ones.
        let result = self.lock.run(move || instance.call(CONSTRUCTOR_IMPLEMENTATION, args));
        if result.is_err() {
            self.release(identity);
        }
        self.finish(result.map(|_| Value::Null), &member)
    }

    /// Instance method entry point. Dispatching a declared `finalize()`
    /// also releases the binding, whatever the outcome.
    pub fn call(&self, identity: ObjectId, class: &str, key: &str, args: &[Value]) -> Outcome {
        let (_, member) = match self.lookup(class, key) {
            Ok(found) => found,
            Err(thrown) => return Outcome::Throw(thrown),
        };
        if member.is_static || member.is_constructor {
            return Outcome::Throw(Thrown::from(&wrong_kind(class, key)));
        }
        let instance = match self.instances.lookup(identity) {
            Ok(instance) => instance,
            Err(err) => return Outcome::Throw(Thrown::from(&err)),
        };
        let implementation = &member.implementation;
        let result = self.lock.run(move || instance.call(implementation, args));
        if member.is_finalizer {
            self.release(identity);
        }
        self.finish(result, &member)
    }

    /// Static method entry point
    pub fn call_static(&self, class: &str, key: &str, args: &[Value]) -> Outcome {
        let (proxy, member) = match self.lookup(class, key) {
            Ok(found) => found,
            Err(thrown) => return Outcome::Throw(thrown),
        };
        if !member.is_static {
            return Outcome::Throw(Thrown::from(&wrong_kind(class, key)));
        }
        let result = self
            .lock
            .run(|| proxy.dynamic().call_static(&member.implementation, args));
        self.finish(result, &member)
    }

    /// Many-to-one entry point: route by `key`, creating the target with
    /// `create` on first use. Results pass through unconverted; failures
    /// without a VM type are wrapped as usual.
    ///
    /// Resolution happens under the interpreter lock, so a creation in
    /// progress never waits for the lock while another thread holding it
    /// waits for that creation.
    pub fn call_keyed<F>(&self, key: DispatchKey, member: &str, args: &[Value], create: F) -> Outcome
    where
        F: FnOnce() -> DynResult<Arc<dyn DynamicObject>>,
    {
        let result = self.lock.run(|| {
            let instance = self.keyed.resolve(key, create)?;
            instance.call(member, args)
        });
        match result {
            Ok(value) => Outcome::Return(value),
            Err(err) => self.translate_unchecked(&err),
        }
    }

    fn translate_unchecked(&self, err: &DynError) -> Outcome {
        Outcome::Throw(translate(
            err,
            &[],
            self.hierarchy.as_ref(),
            &self.config.dynamic_exception,
        ))
    }

    /// Finalizer entry point. The binding is removed without the interpreter
    /// lock; the instance it held is dropped under it.
    pub fn release(&self, identity: ObjectId) {
        if let Some(instance) = self.instances.take(identity) {
            self.lock.run(move || drop(instance));
        }
    }

    /// Drop every binding and class (teardown)
    pub fn clear(&self) {
        self.lock.run(|| {
            self.instances.clear();
            self.keyed.clear();
        });
        self.classes.clear();
    }
}

impl Default for ProxyRuntime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

fn wrong_kind(class: &str, key: &str) -> RegistryError {
    RegistryError::UnknownMember {
        class: class.to_string(),
        member: key.to_string(),
    }
}

static RUNTIME: OnceCell<ProxyRuntime> = OnceCell::new();

/// Install the process runtime. Called once by the native glue at the first
/// class load; fails if a runtime is already installed.
pub fn install(runtime: ProxyRuntime) -> Result<&'static ProxyRuntime, RegistryError> {
    RUNTIME
        .set(runtime)
        .map_err(|_| RegistryError::AlreadyInstalled)?;
    log::debug!("proxy runtime installed");
    RUNTIME.get().ok_or(RegistryError::AlreadyInstalled)
}

/// The installed process runtime, if any
pub fn installed() -> Option<&'static ProxyRuntime> {
    RUNTIME.get()
}
