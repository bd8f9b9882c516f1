//! Interpreter lock

use parking_lot::ReentrantMutex;

/// Serialises calls into the dynamic runtime.
///
/// Reentrant, because dynamic code may call back into the VM, which may call
/// another proxy on the same thread. It may be taken before a registry
/// shard or keyed cell, never while holding one. Bind and unbind do not take
/// it, but instances released by the runtime are dropped under it.
#[derive(Default)]
pub struct InterpreterLock {
    inner: ReentrantMutex<()>,
}

impl InterpreterLock {
    /// Create an unlocked lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.inner.lock();
        f()
    }

    /// Whether some thread holds the lock
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}
