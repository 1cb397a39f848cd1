//! Shared work queue of indexer commands.

use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::seq::SliceRandom;

use dendrite_core::types::{FilePath, IndexerCommand};

/// Thread-safe queue of [`IndexerCommand`]s consumed by parser workers.
///
/// Shuffled once before multi-worker dispatch so neighboring files (which tend
/// to share headers) spread across workers instead of contending on the same
/// shared state.
#[derive(Default)]
pub struct IndexerCommandList {
    commands: Mutex<VecDeque<IndexerCommand>>,
}

impl IndexerCommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: IndexerCommand) {
        self.commands.lock().push_back(command);
    }

    pub fn pop_front(&self) -> Option<IndexerCommand> {
        self.commands.lock().pop_front()
    }

    pub fn size(&self) -> usize {
        self.commands.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.lock().is_empty()
    }

    pub fn shuffle(&self) {
        let mut commands = self.commands.lock();
        commands.make_contiguous().shuffle(&mut rand::thread_rng());
    }

    /// Source paths of all queued commands, in queue order.
    pub fn source_paths(&self) -> Vec<FilePath> {
        self.commands
            .lock()
            .iter()
            .map(|command| command.source_path.clone())
            .collect()
    }
}
