//! Per-file indexing status shared across parser workers.

use dashmap::DashMap;

use dendrite_core::types::FilePath;

/// Indexing state of a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileIndexState {
    Unparsed,
    Indexing,
    Parsed,
}

/// Process-wide map of per-file indexing status.
///
/// Workers claim files with an atomic compare-and-set from `Unparsed` to
/// `Indexing`, so a file claimed by one worker is never reclaimed by another.
#[derive(Default)]
pub struct FileRegisterState {
    states: DashMap<FilePath, FileIndexState>,
}

impl FileRegisterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register files as unparsed; already-registered files keep their state.
    pub fn add_files(&self, paths: impl IntoIterator<Item = FilePath>) {
        for path in paths {
            self.states.entry(path).or_insert(FileIndexState::Unparsed);
        }
    }

    pub fn state(&self, path: &FilePath) -> Option<FileIndexState> {
        self.states.get(path).map(|entry| *entry.value())
    }

    /// Atomically claim an unparsed file for indexing. Returns `false` when
    /// the file is unknown, already claimed or already parsed.
    pub fn try_claim(&self, path: &FilePath) -> bool {
        match self.states.get_mut(path) {
            Some(mut entry) if *entry.value() == FileIndexState::Unparsed => {
                *entry.value_mut() = FileIndexState::Indexing;
                true
            }
            _ => false,
        }
    }

    /// Mark a claimed file as parsed.
    pub fn mark_parsed(&self, path: &FilePath) {
        if let Some(mut entry) = self.states.get_mut(path) {
            *entry.value_mut() = FileIndexState::Parsed;
        }
    }

    /// Release a claim without marking the file parsed (failed or canceled
    /// parse), so another run can pick it up.
    pub fn release(&self, path: &FilePath) {
        if let Some(mut entry) = self.states.get_mut(path) {
            if *entry.value() == FileIndexState::Indexing {
                *entry.value_mut() = FileIndexState::Unparsed;
            }
        }
    }

    pub fn parsed_count(&self) -> usize {
        self.states
            .iter()
            .filter(|entry| *entry.value() == FileIndexState::Parsed)
            .count()
    }
}
