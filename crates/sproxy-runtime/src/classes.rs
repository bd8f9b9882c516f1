//! Registered proxy classes

use crate::error::RegistryError;
use crate::object::DynamicClass;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use sproxy_model::class_spec::FINALIZE_NAME;
use sproxy_model::{ClassSpec, CONSTRUCTOR_NAME};
use sproxy_types::{ClassName, TypeDescriptor};
use std::sync::Arc;

/// What happens when a class name is registered a second time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateClassPolicy {
    /// Keep the first registration and fail the second
    #[default]
    Reject,
    /// The newest registration wins
    Replace,
}

/// Resolved view of one member for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEntry {
    /// Dynamic callable name
    pub implementation: String,
    /// Declared return type (`void` for constructors)
    pub ret: TypeDescriptor,
    /// Declared thrown types
    pub throws: Vec<ClassName>,
    /// Whether the member is static
    pub is_static: bool,
    /// Whether the member is a constructor
    pub is_constructor: bool,
    /// Whether the member is a declared `finalize()`; dispatching it also
    /// releases the binding
    pub is_finalizer: bool,
}

/// A generated class paired with its dynamic implementation
pub struct ProxyClass {
    spec: ClassSpec,
    dynamic: Arc<dyn DynamicClass>,
    members: FxHashMap<String, MemberEntry>,
}

impl ProxyClass {
    /// Pair `spec` with its dynamic class
    pub fn new(spec: ClassSpec, dynamic: Arc<dyn DynamicClass>) -> Self {
        let members = spec
            .members()
            .map(|(name, overload)| {
                let entry = MemberEntry {
                    implementation: overload.implementation().to_string(),
                    ret: overload.signature().ret().clone(),
                    throws: overload.throws().to_vec(),
                    is_static: overload.modifiers().is_static(),
                    is_constructor: name == CONSTRUCTOR_NAME,
                    is_finalizer: name == FINALIZE_NAME
                        && overload.signature().params().is_empty()
                        && !overload.modifiers().is_static(),
                };
                (overload.signature().member_key(name), entry)
            })
            .collect();
        Self {
            spec,
            dynamic,
            members,
        }
    }

    /// Declaration
    pub fn spec(&self) -> &ClassSpec {
        &self.spec
    }

    /// Dynamic class
    pub fn dynamic(&self) -> &Arc<dyn DynamicClass> {
        &self.dynamic
    }

    /// Member by key (`add(I)I`)
    pub fn member(&self, key: &str) -> Result<&MemberEntry, RegistryError> {
        self.members.get(key).ok_or_else(|| RegistryError::UnknownMember {
            class: self.spec.qualified_name().to_string(),
            member: key.to_string(),
        })
    }
}

/// Proxy classes by binary name
pub struct ClassTable {
    classes: DashMap<String, Arc<ProxyClass>>,
    policy: DuplicateClassPolicy,
}

impl ClassTable {
    /// Create an empty table
    pub fn new(policy: DuplicateClassPolicy) -> Self {
        Self {
            classes: DashMap::new(),
            policy,
        }
    }

    /// Active duplicate policy
    pub fn policy(&self) -> DuplicateClassPolicy {
        self.policy
    }

    /// Register a class under its qualified name
    pub fn register(&self, spec: ClassSpec, dynamic: Arc<dyn DynamicClass>) -> Result<Arc<ProxyClass>, RegistryError> {
        let name = spec.qualified_name().to_string();
        let class = Arc::new(ProxyClass::new(spec, dynamic));
        match self.classes.entry(name.clone()) {
            Entry::Vacant(vacant) => {
                vacant.insert(class.clone());
            }
            Entry::Occupied(mut occupied) => match self.policy {
                DuplicateClassPolicy::Reject => return Err(RegistryError::DuplicateClass(name)),
                DuplicateClassPolicy::Replace => {
                    log::warn!("replacing registration of {}", name);
                    occupied.insert(class.clone());
                }
            },
        }
        log::debug!("registered proxy class {}", name);
        Ok(class)
    }

    /// Class by binary name
    pub fn get(&self, name: &str) -> Result<Arc<ProxyClass>, RegistryError> {
        self.classes
            .get(name)
            .map(|entry| entry.clone())
            .ok_or_else(|| RegistryError::UnknownClass(name.to_string()))
    }

    /// Remove a class
    pub fn unregister(&self, name: &str) -> bool {
        self.classes.remove(name).is_some()
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class is registered
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Remove every class
    pub fn clear(&self) {
        self.classes.clear();
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new(DuplicateClassPolicy::default())
    }
}
