//! Write-mode decorator around the indexing phase.

use std::sync::Arc;

use tracing::{debug, warn};

use dendrite_core::events::{EventSink, IndexEvent};
use dendrite_core::traits::PersistentStorage;
use dendrite_core::types::StorageMode;
use dendrite_scheduling::{Blackboard, Task, TaskNode, TaskState};

use crate::storage_provider::StorageProvider;

/// Puts the persistent storage into write mode around its child and restores
/// read mode (rebuilding caches) on every exit path, including failure and
/// cancellation. On cancellation it also discards whatever intermediate
/// storages are still pooled; nothing gets injected after this point.
pub struct TaskParseWrapper {
    storage: Arc<dyn PersistentStorage>,
    provider: Arc<StorageProvider>,
    sink: Arc<dyn EventSink>,
    child: TaskNode,
    failed: bool,
}

impl TaskParseWrapper {
    pub fn new(
        storage: Arc<dyn PersistentStorage>,
        provider: Arc<StorageProvider>,
        sink: Arc<dyn EventSink>,
        child: impl Task + 'static,
    ) -> Self {
        Self {
            storage,
            provider,
            sink,
            child: TaskNode::new(child),
            failed: false,
        }
    }
}

impl Task for TaskParseWrapper {
    fn enter(&mut self, _bb: &Blackboard) {
        if let Err(err) = self.storage.set_mode(StorageMode::Write) {
            warn!(%err, "failed to enter write mode");
            self.failed = true;
        }
    }

    fn update(&mut self, bb: &Blackboard) -> TaskState {
        if self.failed {
            return TaskState::Failure;
        }
        self.child.tick(bb)
    }

    fn exit(&mut self, bb: &Blackboard) {
        if bb.is_canceled() {
            let discarded = self.provider.size();
            if discarded > 0 {
                debug!(discarded, "discarding pooled storages after cancellation");
            }
            self.provider.clear();
        }
        if let Err(err) = self.storage.set_mode(StorageMode::Read) {
            warn!(%err, "failed to restore read mode");
            self.sink
                .emit(IndexEvent::status_error("Could not restore storage read access"));
            return;
        }
        self.storage.build_caches();
    }

    fn reset(&mut self, bb: &Blackboard) {
        self.child.reset(bb);
        self.failed = false;
    }
}
