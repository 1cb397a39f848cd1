//! Leaf tasks of the indexing pipeline.

mod build_index;
mod clean_storage;
mod finish_parsing;
mod inject_storage;
mod merge_storages;
mod parse_wrapper;
mod status_dialog;

pub use build_index::TaskBuildIndex;
pub use clean_storage::TaskCleanStorage;
pub use finish_parsing::TaskFinishParsing;
pub use inject_storage::TaskInjectStorage;
pub use merge_storages::TaskMergeStorages;
pub use parse_wrapper::TaskParseWrapper;
pub use status_dialog::TaskShowStatusDialog;

/// Blackboard key holding the number of commands scheduled for this refresh.
pub const SOURCE_FILE_COUNT_KEY: &str = "source_file_count";

/// Blackboard key holding the number of files indexed so far.
pub const INDEXED_SOURCE_FILE_COUNT_KEY: &str = "indexed_source_file_count";

/// Blackboard key holding the number of currently running indexer workers.
pub const INDEXER_COUNT_KEY: &str = "indexer_count";

/// Blackboard key latched to `true` by the first worker that starts.
///
/// The merge and inject branches wait on this latch rather than on
/// `indexer_count` leaving zero: a counter-based barrier misses the whole
/// indexing phase when every worker finishes between two polls.
pub const INDEXING_STARTED_KEY: &str = "indexing_started";
