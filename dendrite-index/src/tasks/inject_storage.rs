//! Injector stage of the pipeline.

use std::sync::Arc;

use tracing::warn;

use dendrite_core::traits::PersistentStorage;
use dendrite_scheduling::{Blackboard, Task, TaskState};

use crate::storage_provider::StorageProvider;

/// Writes the smallest pooled storage into the persistent storage.
///
/// Fails when the pool is empty so that a surrounding `Selector` can fall
/// through to its wait guard; also fails when the write itself fails, which
/// the storage keeps invisible through transactional injection.
pub struct TaskInjectStorage {
    provider: Arc<StorageProvider>,
    storage: Arc<dyn PersistentStorage>,
}

impl TaskInjectStorage {
    pub fn new(provider: Arc<StorageProvider>, storage: Arc<dyn PersistentStorage>) -> Self {
        Self { provider, storage }
    }
}

impl Task for TaskInjectStorage {
    fn update(&mut self, _bb: &Blackboard) -> TaskState {
        let Some(intermediate) = self.provider.consume_smallest() else {
            return TaskState::Failure;
        };
        match self.storage.inject(intermediate) {
            Ok(()) => TaskState::Success,
            Err(err) => {
                warn!(%err, "storage injection failed");
                TaskState::Failure
            }
        }
    }
}
