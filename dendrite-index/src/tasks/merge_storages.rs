//! Merger stage of the pipeline.

use std::sync::Arc;

use dendrite_scheduling::{Blackboard, Task, TaskState};

use crate::storage_provider::StorageProvider;

/// Merges the two smallest pooled storages into one.
///
/// Fails when fewer than two storages are pooled so that a surrounding
/// `Selector` can fall through to its wait guard.
pub struct TaskMergeStorages {
    provider: Arc<StorageProvider>,
}

impl TaskMergeStorages {
    pub fn new(provider: Arc<StorageProvider>) -> Self {
        Self { provider }
    }
}

impl Task for TaskMergeStorages {
    fn update(&mut self, _bb: &Blackboard) -> TaskState {
        match self.provider.consume_two_smallest() {
            Some((mut first, second)) => {
                first.merge_from(second);
                self.provider.push(first);
                TaskState::Success
            }
            None => TaskState::Failure,
        }
    }
}
