// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared, lock-protected access to a registry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::Registry;

/// A cloneable handle to a registry shared between threads.
///
/// A panic while the lock is held poisons a plain `Mutex`; this handle
/// recovers the guard instead, so one misbehaving action does not wedge
/// every later pipeline run.
#[derive(Clone, Debug)]
pub struct RegistryHandle(Arc<Mutex<Registry>>);

impl RegistryHandle {
    /// Wraps a registry for sharing.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self(Arc::new(Mutex::new(registry)))
    }

    /// Locks the registry, blocking until it is available.
    pub fn lock(&self) -> MutexGuard<'_, Registry> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with the registry locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut Registry) -> R) -> R {
        f(&mut self.lock())
    }
}

impl From<Registry> for RegistryHandle {
    fn from(registry: Registry) -> Self {
        Self::new(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemClass;

    #[test]
    fn lock_survives_poisoning() {
        let handle = RegistryHandle::new(Registry::with_default_classes());
        let clone = handle.clone();
        let joined = std::thread::spawn(move || {
            let _guard = clone.lock();
            panic!("boom");
        })
        .join();
        assert!(joined.is_err(), "thread panicked");
        let known = handle.with(|r| r.class_config(ItemClass::NODE).is_ok());
        assert!(known, "registry still usable after poisoning");
    }
}
