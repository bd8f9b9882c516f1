//! Many-to-one routing for dynamic proxies

use crate::error::DispatchError;
use crate::identity::DispatchKey;
use crate::object::{DynResult, DynamicObject};
use crate::value::Value;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;

type Cell = Arc<OnceCell<Arc<dyn DynamicObject>>>;

/// Lookup-or-create registry keyed by [`DispatchKey`].
///
/// At most one creation runs per key, even under contention; losers of the
/// race block until the winner finishes and then share its instance. A
/// failed creation leaves the key empty so a later call can retry. Entries
/// are only ever removed all at once by [`KeyedRegistry::clear`].
pub struct KeyedRegistry {
    entries: DashMap<DispatchKey, Cell>,
}

impl KeyedRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Instance for `key`, creating it with `create` if there is none yet.
    ///
    /// Callers that create under the interpreter lock must already hold it
    /// when calling this, or a creation could wait on the lock while the
    /// lock holder waits on the creation.
    pub fn resolve<F>(&self, key: DispatchKey, create: F) -> DynResult<Arc<dyn DynamicObject>>
    where
        F: FnOnce() -> DynResult<Arc<dyn DynamicObject>>,
    {
        // Clone the cell out so creation runs without the shard lock.
        let cell = self.entries.entry(key).or_default().clone();
        let instance = cell.get_or_try_init(|| {
            log::debug!("creating keyed instance");
            create()
        })?;
        Ok(instance.clone())
    }

    /// Resolve `key` and invoke `member` on the result
    pub fn dispatch<F>(&self, key: DispatchKey, member: &str, args: &[Value], create: F) -> Result<Value, DispatchError>
    where
        F: FnOnce() -> DynResult<Arc<dyn DynamicObject>>,
    {
        let instance = self.resolve(key, create)?;
        Ok(instance.call(member, args)?)
    }

    /// Whether an instance exists for `key`
    pub fn contains(&self, key: &DispatchKey) -> bool {
        self.entries
            .get(key)
            .map(|cell| cell.get().is_some())
            .unwrap_or(false)
    }

    /// Number of keys seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key has been seen
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry (teardown)
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl Default for KeyedRegistry {
    fn default() -> Self {
        Self::new()
    }
}
