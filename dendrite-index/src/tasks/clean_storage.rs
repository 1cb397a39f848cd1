//! Task deleting stale records before a refresh.

use std::sync::Arc;

use tracing::{debug, warn};

use dendrite_core::traits::PersistentStorage;
use dendrite_core::types::FilePath;
use dendrite_scheduling::{Blackboard, Task, TaskState};

/// Records deleted per update, keeping each tick bounded.
const CLEAN_CHUNK_SIZE: usize = 100;

/// Batch-deletes all records whose source file is in the given set.
///
/// Runs inside an explicit write transaction: a canceled or failed clean rolls
/// back, so the storage never ends up with half the stale records removed.
pub struct TaskCleanStorage {
    storage: Arc<dyn PersistentStorage>,
    paths: Vec<FilePath>,
    cursor: usize,
    transaction_open: bool,
    failed: bool,
}

impl TaskCleanStorage {
    pub fn new(storage: Arc<dyn PersistentStorage>, paths: Vec<FilePath>) -> Self {
        Self {
            storage,
            paths,
            cursor: 0,
            transaction_open: false,
            failed: false,
        }
    }
}

impl Task for TaskCleanStorage {
    fn enter(&mut self, _bb: &Blackboard) {
        debug!(files = self.paths.len(), "cleaning storage");
        match self.storage.begin_write() {
            Ok(()) => self.transaction_open = true,
            Err(err) => {
                warn!(%err, "failed to open clean transaction");
                self.failed = true;
            }
        }
    }

    fn update(&mut self, _bb: &Blackboard) -> TaskState {
        if self.failed {
            return TaskState::Failure;
        }
        let end = (self.cursor + CLEAN_CHUNK_SIZE).min(self.paths.len());
        if let Err(err) = self.storage.clean_files(&self.paths[self.cursor..end]) {
            warn!(%err, "failed to clean files");
            self.failed = true;
            return TaskState::Failure;
        }
        self.cursor = end;
        if self.cursor == self.paths.len() {
            TaskState::Success
        } else {
            TaskState::Running
        }
    }

    fn exit(&mut self, bb: &Blackboard) {
        if !self.transaction_open {
            return;
        }
        if self.failed || bb.is_canceled() {
            self.storage.rollback();
        } else if let Err(err) = self.storage.commit() {
            warn!(%err, "failed to commit clean transaction");
        }
        self.transaction_open = false;
    }

    fn reset(&mut self, _bb: &Blackboard) {
        self.cursor = 0;
        self.failed = false;
    }
}
