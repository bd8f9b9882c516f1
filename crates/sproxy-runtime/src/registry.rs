//! One-to-one routing from VM identities to dynamic instances

use crate::error::{DispatchError, RegistryError};
use crate::identity::ObjectId;
use crate::object::{same_object, DynamicObject};
use crate::value::Value;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Signalled once an unbind has finished releasing its instance
#[derive(Default)]
struct UnbindGate {
    done: Mutex<bool>,
    cond: Condvar,
}

impl UnbindGate {
    fn wait(&self) {
        let mut done = self.done.lock();
        while !*done {
            self.cond.wait(&mut done);
        }
    }

    fn open(&self) {
        *self.done.lock() = true;
        self.cond.notify_all();
    }
}

enum Slot {
    Bound(Arc<dyn DynamicObject>),
    Unbinding(Arc<UnbindGate>),
}

/// Registry of bound instances.
///
/// Each identity moves through Unbound, Bound and Unbinding. Lookups clone
/// the instance out under the shard lock and call it after the lock is
/// released, so an unbind never waits for calls in flight and those calls
/// finish against the instance they started with.
pub struct InstanceRegistry {
    slots: DashMap<ObjectId, Slot>,
}

impl InstanceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Bind `id` to `instance`.
    ///
    /// Rebinding the same instance is a no-op. If `id` is being unbound, waits
    /// for the unbind to finish first.
    pub fn bind(&self, id: ObjectId, instance: Arc<dyn DynamicObject>) -> Result<(), RegistryError> {
        loop {
            let gate = match self.slots.entry(id) {
                Entry::Vacant(vacant) => {
                    vacant.insert(Slot::Bound(instance));
                    log::debug!("bound object {}", id);
                    return Ok(());
                }
                Entry::Occupied(occupied) => match occupied.get() {
                    Slot::Bound(existing) if same_object(existing, &instance) => return Ok(()),
                    Slot::Bound(_) => return Err(RegistryError::AlreadyBound(id)),
                    Slot::Unbinding(gate) => gate.clone(),
                },
            };
            gate.wait();
        }
    }

    /// Bound instance for `id`
    pub fn lookup(&self, id: ObjectId) -> Result<Arc<dyn DynamicObject>, RegistryError> {
        match self.slots.get(&id).as_deref() {
            Some(Slot::Bound(instance)) => Ok(instance.clone()),
            _ => Err(RegistryError::UnboundInstance(id)),
        }
    }

    /// Invoke `member` on the instance bound to `id`
    pub fn dispatch(&self, id: ObjectId, member: &str, args: &[Value]) -> Result<Value, DispatchError> {
        let instance = self.lookup(id)?;
        Ok(instance.call(member, args)?)
    }

    /// Remove the binding for `id`, dropping the registry's reference to the
    /// instance. Returns whether a binding was removed.
    ///
    /// The instance is dropped outside the shard lock and before waiting binds
    /// of `id` are let through.
    pub fn unbind(&self, id: ObjectId) -> bool {
        let gate = Arc::new(UnbindGate::default());
        let released = match self.slots.get_mut(&id) {
            Some(mut slot) if matches!(*slot, Slot::Bound(_)) => {
                std::mem::replace(&mut *slot, Slot::Unbinding(gate.clone()))
            }
            _ => {
                log::warn!("unbind of object {} which is not bound; ignoring", id);
                return false;
            }
        };

        drop(released);
        self.slots
            .remove_if(&id, |_, slot| matches!(slot, Slot::Unbinding(g) if Arc::ptr_eq(g, &gate)));
        gate.open();
        log::debug!("unbound object {}", id);
        true
    }

    /// Remove the binding for `id` and hand back the instance instead of
    /// dropping it, so the caller decides where its teardown runs.
    pub fn take(&self, id: ObjectId) -> Option<Arc<dyn DynamicObject>> {
        match self.slots.remove_if(&id, |_, slot| matches!(slot, Slot::Bound(_))) {
            Some((_, Slot::Bound(instance))) => {
                log::debug!("took object {}", id);
                Some(instance)
            }
            _ => {
                log::warn!("take of object {} which is not bound; ignoring", id);
                None
            }
        }
    }

    /// Whether `id` is currently bound
    pub fn is_bound(&self, id: ObjectId) -> bool {
        matches!(self.slots.get(&id).as_deref(), Some(Slot::Bound(_)))
    }

    /// Number of identities bound or being unbound
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every binding (teardown)
    pub fn clear(&self) {
        let ids: Vec<ObjectId> = self.slots.iter().map(|entry| *entry.key()).collect();
        for id in ids {
            if self.is_bound(id) {
                self.unbind(id);
            }
        }
    }
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
