//! Assembly of the refresh task tree.

use std::sync::Arc;

use dendrite_core::events::EventSink;
use dendrite_core::traits::{Indexer, PersistentStorage};
use dendrite_core::types::FilePath;
use dendrite_scheduling::{
    Comparison, Parallel, Repeat, ReturnSuccessWhile, Selector, Sequence, SetValue,
};

use crate::access_proxy::StorageAccessProxy;
use crate::command_list::IndexerCommandList;
use crate::file_register::FileRegisterState;
use crate::storage_provider::StorageProvider;
use crate::tasks::{
    TaskBuildIndex, TaskCleanStorage, TaskFinishParsing, TaskInjectStorage, TaskMergeStorages,
    TaskParseWrapper, TaskShowStatusDialog, INDEXED_SOURCE_FILE_COUNT_KEY, INDEXER_COUNT_KEY,
    INDEXING_STARTED_KEY, SOURCE_FILE_COUNT_KEY,
};

/// Everything needed to assemble one refresh root.
pub struct PipelineSetup {
    pub storage: Arc<dyn PersistentStorage>,
    pub proxy: Arc<StorageAccessProxy>,
    pub indexer: Arc<dyn Indexer>,
    pub sink: Arc<dyn EventSink>,
    pub commands: Arc<IndexerCommandList>,
    pub files_to_clean: Vec<FilePath>,
    pub worker_count: usize,
}

fn indexing_not_started() -> ReturnSuccessWhile<bool> {
    ReturnSuccessWhile::new(INDEXING_STARTED_KEY, Comparison::Equals, false)
}

fn indexers_running() -> ReturnSuccessWhile<i64> {
    ReturnSuccessWhile::new(INDEXER_COUNT_KEY, Comparison::GreaterThan, 0)
}

/// Build the root task tree for one refresh.
///
/// ```text
/// Sequence
/// ├── SetValue(source_file_count / indexed_source_file_count /
/// │            indexer_count / indexing_started)
/// ├── TaskCleanStorage                       when files_to_clean is non-empty
/// ├── TaskParseWrapper                       when commands were scheduled
/// │     ├── Parallel
/// │     │     ├── K x Repeat(TaskBuildIndex)
/// │     │     ├── merger branch  (wait for first worker, merge while workers run)
/// │     │     └── injector branch (wait for first worker, inject while workers run)
/// │     ├── TaskShowStatusDialog
/// │     └── Repeat(TaskInjectStorage)        drain whatever is left pooled
/// └── TaskFinishParsing
/// ```
///
/// The `ReturnSuccessWhile` guards act as barriers: mergers and the injector
/// wait until the first worker registered itself, loop while workers remain,
/// and the trailing repeat drains the pool after all workers have exited. The
/// status dialog and the drain run inside the parse wrapper so every injection
/// happens while the storage still holds write access.
pub fn build_refresh_root(setup: PipelineSetup) -> Sequence {
    let command_count = setup.commands.size();

    let mut root = Sequence::new();
    root.add_task(SetValue::new(SOURCE_FILE_COUNT_KEY, command_count as i64));
    root.add_task(SetValue::new(INDEXED_SOURCE_FILE_COUNT_KEY, 0i64));
    root.add_task(SetValue::new(INDEXER_COUNT_KEY, 0i64));
    root.add_task(SetValue::new(INDEXING_STARTED_KEY, false));

    if !setup.files_to_clean.is_empty() {
        root.add_task(TaskCleanStorage::new(
            setup.storage.clone(),
            setup.files_to_clean.clone(),
        ));
    }

    if command_count > 0 {
        let provider = Arc::new(StorageProvider::new());
        let register = Arc::new(FileRegisterState::new());
        register.add_files(setup.commands.source_paths());

        let worker_count = setup.worker_count.min(command_count).max(1);

        let mut parallel = Parallel::new();
        for _ in 0..worker_count {
            parallel.add_task(Repeat::while_success(TaskBuildIndex::new(
                setup.commands.clone(),
                provider.clone(),
                register.clone(),
                setup.indexer.clone(),
            )));
        }

        // Merge while workers are producing; once nothing is left to merge and
        // no worker is running, the selector fails and the loop ends.
        let mut merger = Sequence::new();
        merger.add_task(Repeat::while_success(indexing_not_started()));
        merger.add_task(Repeat::while_success(
            Selector::new()
                .with_task(TaskMergeStorages::new(provider.clone()))
                .with_task(indexers_running()),
        ));
        parallel.add_task(merger);

        // Inject while workers are producing. The leading guard stops the loop
        // as soon as no worker is running, regardless of what is still pooled;
        // the trailing drain picks that up.
        let mut injector = Sequence::new();
        injector.add_task(Repeat::while_success(indexing_not_started()));
        injector.add_task(Repeat::while_success(
            Sequence::new()
                .with_task(indexers_running())
                .with_task(
                    Selector::new()
                        .with_task(TaskInjectStorage::new(
                            provider.clone(),
                            setup.storage.clone(),
                        ))
                        .with_task(indexers_running()),
                ),
        ));
        parallel.add_task(injector);

        let mut indexing_phase = Sequence::new();
        indexing_phase.add_task(parallel);
        indexing_phase.add_task(TaskShowStatusDialog::new(
            "Finish Indexing",
            "Saving remaining data",
            setup.sink.clone(),
        ));
        indexing_phase.add_task(Repeat::while_success(TaskInjectStorage::new(
            provider.clone(),
            setup.storage.clone(),
        )));

        root.add_task(TaskParseWrapper::new(
            setup.storage.clone(),
            provider,
            setup.sink.clone(),
            indexing_phase,
        ));
    }

    root.add_task(TaskFinishParsing::new(
        setup.storage,
        setup.proxy,
        setup.sink,
    ));
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_storage::InMemoryStorage;
    use dendrite_core::error::Result;
    use dendrite_core::events::{BufferSink, IndexEvent};
    use dendrite_core::intermediate::{IntermediateStorage, Symbol, SymbolKind};
    use dendrite_core::types::{IndexerCommand, Language, StorageMode};
    use dendrite_scheduling::{Blackboard, Task, TaskNode, TaskState};

    struct StubIndexer;

    impl Indexer for StubIndexer {
        fn index(&self, command: &IndexerCommand) -> Result<IntermediateStorage> {
            let mut storage = IntermediateStorage::new();
            storage.add_symbol(Symbol::new(
                "sym",
                SymbolKind::Function,
                command.source_path.clone(),
            ));
            storage.add_file_info(dendrite_core::types::FileInfo::new(
                command.source_path.clone(),
                chrono::Utc::now(),
            ));
            Ok(storage)
        }
    }

    fn drive(root: Sequence) -> (TaskState, Blackboard) {
        let bb = Blackboard::new();
        let mut node = TaskNode::new(root);
        let state = loop {
            let state = node.tick(&bb);
            if state.is_terminal() {
                break state;
            }
        };
        (state, bb)
    }

    #[test]
    fn test_refresh_tree_indexes_all_commands() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.set_mode(StorageMode::Read).unwrap();
        let commands = Arc::new(IndexerCommandList::new());
        for i in 0..6 {
            commands.push(IndexerCommand::new(format!("{i}.cpp"), Language::Cpp));
        }
        let sink = BufferSink::new();

        let root = build_refresh_root(PipelineSetup {
            storage: storage.clone(),
            proxy: Arc::new(StorageAccessProxy::new()),
            indexer: Arc::new(StubIndexer),
            sink: sink.clone(),
            commands,
            files_to_clean: Vec::new(),
            worker_count: 3,
        });

        let (state, bb) = drive(root);
        assert_eq!(state, TaskState::Success);
        assert_eq!(storage.info_on_all_files().len(), 6);
        assert_eq!(bb.get::<i64>(INDEXED_SOURCE_FILE_COUNT_KEY), Some(6));
        assert_eq!(bb.get::<i64>(INDEXER_COUNT_KEY), Some(0));
        assert_eq!(storage.mode(), StorageMode::Read);
        assert!(sink.contains(|e| matches!(e, IndexEvent::FinishedParsing)));
    }

    #[test]
    fn test_empty_command_list_skips_indexing_phase() {
        let storage = Arc::new(InMemoryStorage::new());
        storage.set_mode(StorageMode::Read).unwrap();
        let sink = BufferSink::new();

        let root = build_refresh_root(PipelineSetup {
            storage: storage.clone(),
            proxy: Arc::new(StorageAccessProxy::new()),
            indexer: Arc::new(StubIndexer),
            sink: sink.clone(),
            commands: Arc::new(IndexerCommandList::new()),
            files_to_clean: vec![FilePath::from("gone.cpp")],
            worker_count: 4,
        });

        let (state, _) = drive(root);
        assert_eq!(state, TaskState::Success);
        // No dialog: the indexing phase never ran.
        assert!(!sink.contains(|e| matches!(e, IndexEvent::ShowStatusDialog { .. })));
        assert!(sink.contains(|e| matches!(e, IndexEvent::FinishedParsing)));
    }
}
