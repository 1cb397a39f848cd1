//! Core traits defining interfaces between the engine and its collaborators.

use crate::error::Result;
use crate::intermediate::IntermediateStorage;
use crate::types::{FileInfo, FilePath, FilePathSet, IndexerCommand, Language, StorageMode};

/// Durable symbol database consumed by the engine.
///
/// The engine never sees schema details; it drives the storage exclusively
/// through these operations. Implementations use interior mutability: mode
/// transitions and writes synchronize internally, and `inject` is transactional
/// so that a failed or canceled injection leaves no partial content behind.
pub trait PersistentStorage: Send + Sync {
    /// Whether the storage holds no file records at all.
    fn is_empty(&self) -> bool;

    /// Whether the storage was written by an incompatible version.
    fn is_incompatible(&self) -> bool;

    /// Current access mode.
    fn mode(&self) -> StorageMode;

    /// Switch between read and write access. Only one task at a time may hold
    /// write access.
    fn set_mode(&self, mode: StorageMode) -> Result<()>;

    /// Rebuild in-memory lookup caches after content changed.
    fn build_caches(&self);

    /// Records of all files known to the storage.
    fn info_on_all_files(&self) -> Vec<FileInfo>;

    /// Files that (transitively) reference any file in `paths`.
    fn referencing(&self, paths: &FilePathSet) -> FilePathSet;

    /// Files referenced by any file in `paths`.
    fn referenced_by(&self, paths: &FilePathSet) -> FilePathSet;

    /// Content snapshot of the project settings at last index time.
    fn project_settings_text(&self) -> String;

    fn set_project_settings_text(&self, text: &str) -> Result<()>;

    /// Drop all indexed content.
    fn clear(&self) -> Result<()>;

    /// Begin an explicit write transaction; used by the clean task so a
    /// canceled clean can roll back.
    fn begin_write(&self) -> Result<()>;

    /// Commit the open write transaction.
    fn commit(&self) -> Result<()>;

    /// Discard the open write transaction.
    fn rollback(&self);

    /// Delete all symbols, references and file records whose source file is in
    /// `paths`. Runs inside the open write transaction.
    fn clean_files(&self, paths: &[FilePath]) -> Result<()>;

    /// Integrate one intermediate storage. Transactional: on error none of the
    /// storage's content is visible.
    fn inject(&self, storage: IntermediateStorage) -> Result<()>;
}

/// A set of source files governed by one language/toolchain configuration.
pub trait SourceGroup: Send + Sync {
    fn language(&self) -> Language;

    /// Re-read the group's configuration before a refresh. Returns `false` if
    /// the group cannot be refreshed (missing paths, broken toolchain).
    fn prepare_refresh(&self) -> bool {
        true
    }

    /// All source file paths currently governed by the group.
    fn all_source_paths(&self) -> FilePathSet;

    /// Which source files must be indexed given that `static_paths` are
    /// considered up to date. The default reindexes everything outside the
    /// static set; groups tracking toolchain state may add static files whose
    /// compiler flags changed since the last run.
    fn source_paths_to_index(&self, static_paths: &FilePathSet) -> FilePathSet {
        self.all_source_paths()
            .into_iter()
            .filter(|path| !static_paths.contains(path))
            .collect()
    }

    /// Indexer commands for the files in `paths` governed by this group.
    fn indexer_commands(&self, paths: &FilePathSet) -> Vec<IndexerCommand>;
}

/// Language-specific parser invoked by the indexing workers.
///
/// The engine treats parsers as opaque: one command in, one intermediate
/// storage out. Implementations must be callable from multiple worker threads.
pub trait Indexer: Send + Sync {
    fn index(&self, command: &IndexerCommand) -> Result<IntermediateStorage>;
}

/// Filesystem queries the delta planner depends on.
///
/// Injected so the planner stays pure given its inputs; production code uses
/// [`crate::fs::OsFileQuery`], tests substitute a fixed map.
pub trait FileQuery: Send + Sync {
    /// Info for the file at `path`, or `None` if it does not exist.
    fn file_info(&self, path: &FilePath) -> Option<FileInfo>;
}
