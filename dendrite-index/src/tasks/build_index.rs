//! Parser worker task.

use std::sync::Arc;

use tracing::{debug, error, warn};

use dendrite_core::intermediate::IntermediateStorage;
use dendrite_core::traits::Indexer;
use dendrite_scheduling::{Blackboard, Task, TaskState};

use crate::command_list::IndexerCommandList;
use crate::file_register::FileRegisterState;
use crate::storage_provider::StorageProvider;
use crate::tasks::{INDEXED_SOURCE_FILE_COUNT_KEY, INDEXER_COUNT_KEY, INDEXING_STARTED_KEY};

/// One indexing worker: pops a command, runs the parser, pushes the result.
///
/// Wrapped in `Repeat::while_success` per worker thread, so each update handles
/// exactly one command and the drained queue ends the loop. The worker
/// registers itself in `indexer_count` on enter and deregisters on exit; the
/// guards of the merge and inject branches synchronize on that counter.
pub struct TaskBuildIndex {
    commands: Arc<IndexerCommandList>,
    provider: Arc<StorageProvider>,
    register: Arc<FileRegisterState>,
    indexer: Arc<dyn Indexer>,
}

impl TaskBuildIndex {
    pub fn new(
        commands: Arc<IndexerCommandList>,
        provider: Arc<StorageProvider>,
        register: Arc<FileRegisterState>,
        indexer: Arc<dyn Indexer>,
    ) -> Self {
        Self {
            commands,
            provider,
            register,
            indexer,
        }
    }
}

impl Task for TaskBuildIndex {
    fn enter(&mut self, bb: &Blackboard) {
        bb.set(INDEXING_STARTED_KEY, true);
        bb.update::<i64>(INDEXER_COUNT_KEY, |count| count.unwrap_or(0) + 1);
    }

    fn update(&mut self, bb: &Blackboard) -> TaskState {
        let Some(command) = self.commands.pop_front() else {
            // Queue drained; the surrounding repeat converts this into its
            // exit state.
            return TaskState::Failure;
        };

        if !self.register.try_claim(&command.source_path) {
            // Another worker already owns this file.
            return TaskState::Success;
        }

        debug!(path = %command.source_path, "indexing");
        match self.indexer.index(&command) {
            Ok(storage) => {
                self.provider.push(storage);
                self.register.mark_parsed(&command.source_path);
                bb.update::<i64>(INDEXED_SOURCE_FILE_COUNT_KEY, |count| count.unwrap_or(0) + 1);
                TaskState::Success
            }
            Err(err) if command.cancel_on_fatal_errors => {
                error!(path = %command.source_path, %err, "fatal parser error, canceling refresh");
                self.register.release(&command.source_path);
                bb.cancel();
                TaskState::Failure
            }
            Err(err) => {
                warn!(path = %command.source_path, %err, "parser error recorded, continuing");
                let mut storage = IntermediateStorage::new();
                storage.add_diagnostic(command.source_path.clone(), err.to_string(), true);
                self.provider.push(storage);
                self.register.mark_parsed(&command.source_path);
                bb.update::<i64>(INDEXED_SOURCE_FILE_COUNT_KEY, |count| count.unwrap_or(0) + 1);
                TaskState::Success
            }
        }
    }

    fn exit(&mut self, bb: &Blackboard) {
        bb.update::<i64>(INDEXER_COUNT_KEY, |count| count.unwrap_or(1) - 1);
    }
}
