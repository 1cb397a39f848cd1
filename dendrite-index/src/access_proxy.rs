//! Swap point handing the indexed storage to readers.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use dendrite_core::traits::PersistentStorage;

/// Proxy through which front-end components read the persistent storage.
///
/// Holds a weak handle so the project controller stays the single owner; the
/// subject is swapped after a load or a successful refresh and cleared while
/// the project reloads.
#[derive(Default)]
pub struct StorageAccessProxy {
    subject: RwLock<Option<Weak<dyn PersistentStorage>>>,
}

impl StorageAccessProxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_subject(&self, storage: &Arc<dyn PersistentStorage>) {
        *self.subject.write() = Some(Arc::downgrade(storage));
    }

    pub fn clear_subject(&self) {
        *self.subject.write() = None;
    }

    /// Current storage, if one is set and still alive.
    pub fn subject(&self) -> Option<Arc<dyn PersistentStorage>> {
        self.subject.read().as_ref().and_then(Weak::upgrade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_storage::InMemoryStorage;

    #[test]
    fn test_subject_swap_and_clear() {
        let proxy = StorageAccessProxy::new();
        assert!(proxy.subject().is_none());

        let storage: Arc<dyn PersistentStorage> = Arc::new(InMemoryStorage::new());
        proxy.set_subject(&storage);
        assert!(proxy.subject().is_some());

        proxy.clear_subject();
        assert!(proxy.subject().is_none());
    }

    #[test]
    fn test_weak_handle_does_not_keep_storage_alive() {
        let proxy = StorageAccessProxy::new();
        let storage: Arc<dyn PersistentStorage> = Arc::new(InMemoryStorage::new());
        proxy.set_subject(&storage);

        drop(storage);
        assert!(proxy.subject().is_none());
    }
}
